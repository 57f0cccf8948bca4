use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Coarse authorization level. Admins see every ticket plus the admin
/// surface; users see only their own tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Employee profile row. Upserted on every successful login; login is the
/// sole writer, so the row always mirrors the directory's latest answer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub employee_id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub department: String,
    pub role: Role,
    pub supervisor_email: Option<String>,
    pub created_at: DateTime<Utc>,
}
