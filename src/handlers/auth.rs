use axum::{extract::Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{issue_token, Claims};
use crate::config;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login - Verify credentials against the directory and
/// mint a session token. The profile row is upserted on success only; a
/// failed login writes nothing.
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Value> {
    let profile = state
        .directory
        .authenticate(&req.username, &req.password)
        .await?;

    state.store.upsert_user(&profile).await?;

    let config = config::config();
    let claims = Claims::new(
        profile.employee_id.clone(),
        profile.username.clone(),
        profile.role,
        config.jwt_expiry_hours,
    );
    let token = issue_token(&claims, &config.jwt_secret)?;

    tracing::info!(employee = %profile.employee_id, "login succeeded");

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": profile,
    })))
}

/// GET /api/auth/me - The live user row for the presented token.
pub async fn me(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "user": auth.0 })))
}
