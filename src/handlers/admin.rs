use axum::{extract::Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::database::models::{Role, TeamMember};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/admin/dashboard-stats - Four independent counts over the
/// ticket table (admin).
pub async fn dashboard_stats(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    auth.require_role(Role::Admin)?;

    let stats = state.tickets.counts().await?;
    Ok(ApiResponse::success(json!({ "stats": stats })))
}

/// GET /api/admin/team-members - The assignment roster, ordered by name
/// (admin).
pub async fn team_members(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    auth.require_role(Role::Admin)?;

    let members = state.store.team_members().await?;
    Ok(ApiResponse::success(json!({ "members": members })))
}

#[derive(Debug, Deserialize)]
pub struct NewTeamMemberRequest {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
}

/// POST /api/admin/team-members - Append to the roster (admin). Duplicate
/// employee ids are rejected with 409.
pub async fn add_team_member(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<NewTeamMemberRequest>,
) -> ApiResult<Value> {
    auth.require_role(Role::Admin)?;

    for (field, value) in [
        ("employee_id", &req.employee_id),
        ("name", &req.name),
        ("email", &req.email),
        ("department", &req.department),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::validation(format!("Missing required field: {}", field)));
        }
    }

    let member = TeamMember {
        employee_id: req.employee_id,
        name: req.name,
        email: req.email,
        department: req.department,
        role: TeamMember::DEFAULT_ROLE.to_string(),
        created_at: Utc::now(),
    };
    state.store.add_team_member(&member).await?;

    Ok(ApiResponse::success(json!({
        "message": "Team member added successfully",
    })))
}

/// GET /api/admin/settings - The key/value configuration map. Open to any
/// authenticated user (the frontend needs the company branding).
pub async fn settings(Extension(state): Extension<AppState>) -> ApiResult<Value> {
    let rows = state.store.settings().await?;

    let mut map = Map::new();
    for row in rows {
        map.insert(row.key, Value::String(row.value));
    }
    Ok(ApiResponse::success(json!({ "settings": map })))
}

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
}

/// POST /api/admin/settings - Update company name and/or logo (admin).
/// Each present key is upserted independently.
pub async fn update_settings(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<SettingsRequest>,
) -> ApiResult<Value> {
    auth.require_role(Role::Admin)?;

    if let Some(name) = req.company_name.as_deref() {
        state.store.put_setting("company_name", name).await?;
    }
    if let Some(logo) = req.company_logo.as_deref() {
        state.store.put_setting("company_logo", logo).await?;
    }

    Ok(ApiResponse::success(json!({
        "message": "Settings updated successfully",
    })))
}
