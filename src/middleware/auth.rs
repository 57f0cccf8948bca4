use axum::{
    extract::{Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::verify_token;
use crate::config;
use crate::database::models::{Role, User};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context attached to the request after credential
/// verification. Holds the live user row, not the token claims: the role
/// can change out-of-band via a later login, so the store is re-resolved
/// on every request.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn employee_id(&self) -> &str {
        &self.0.employee_id
    }

    /// Uniform authorization check, used declaratively by every handler
    /// that gates on a role.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.0.role == role {
            Ok(())
        } else {
            Err(ApiError::forbidden("Access denied"))
        }
    }
}

/// Bearer-token middleware: verifies the credential, re-resolves the user
/// row, and injects [`AuthUser`] into request extensions.
pub async fn require_auth(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let claims = verify_token(token, &config::config().jwt_secret)?;

    let user = state
        .store
        .find_user(&claims.employee_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
