use axum::{
    extract::{Extension, Multipart, Path},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{Role, TicketStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::tickets::NewTicketInput;
use crate::state::AppState;

/// Attachment parts accepted per ticket.
const MAX_ATTACHMENTS: usize = 5;

/// POST /api/tickets/create - File a ticket (multipart: text fields plus
/// up to five `attachments` file parts). Attachment names are recorded on
/// the ticket; byte storage is a separate concern.
pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<Value> {
    let mut input = NewTicketInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "type" => input.ticket_type = read_text(field).await?,
            "severity" => input.severity = read_text(field).await?,
            "supervisor_email" => input.supervisor_email = read_text(field).await?,
            "location" => input.location = read_text(field).await?,
            "description" => input.description = read_text(field).await?,
            "attachments" => {
                if input.attachments.len() >= MAX_ATTACHMENTS {
                    return Err(ApiError::validation(format!(
                        "At most {} attachments are allowed",
                        MAX_ATTACHMENTS
                    )));
                }
                if let Some(file_name) = field.file_name().map(ToString::to_string) {
                    // The part must be drained even though the bytes are
                    // handed to external storage, not persisted here.
                    field.bytes().await.map_err(|e| {
                        ApiError::validation(format!("Failed to read attachment: {}", e))
                    })?;
                    input.attachments.push(file_name);
                }
            }
            _ => {}
        }
    }

    let ticket_id = state.tickets.create(&auth.0, input).await?;

    Ok(ApiResponse::success(json!({
        "message": "Ticket created successfully",
        "ticket_id": ticket_id,
    })))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart field: {}", e)))
}

/// GET /api/tickets/my-tickets - The caller's own tickets, newest first.
pub async fn my_tickets(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    let tickets = state.tickets.owned_by(auth.employee_id()).await?;
    Ok(ApiResponse::success(json!({ "tickets": tickets })))
}

/// GET /api/tickets/all - Every ticket with owner info joined (admin).
pub async fn all_tickets(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    auth.require_role(Role::Admin)?;

    let tickets = state.tickets.all_with_owners().await?;
    Ok(ApiResponse::success(json!({ "tickets": tickets })))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// PUT /api/tickets/:ticket_id/status - Move a ticket along the lifecycle
/// graph. Off-graph transitions are rejected with 409.
pub async fn update_status(
    Extension(state): Extension<AppState>,
    Path(ticket_id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Value> {
    let next = TicketStatus::parse(&req.status)
        .ok_or_else(|| ApiError::validation(format!("Unknown status: {}", req.status)))?;

    state.tickets.update_status(&ticket_id, next).await?;

    Ok(ApiResponse::success(json!({
        "message": "Ticket updated successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub assigned_to: String,
}

/// PUT /api/tickets/:ticket_id/assign - Hand a ticket to a team member,
/// forcing it In Progress (admin).
pub async fn assign(
    Extension(state): Extension<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(ticket_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Value> {
    auth.require_role(Role::Admin)?;

    state.tickets.assign(&ticket_id, &req.assigned_to).await?;

    Ok(ApiResponse::success(json!({
        "message": "Ticket assigned successfully",
    })))
}
