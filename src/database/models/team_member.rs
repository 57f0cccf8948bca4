use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Assignment roster entry. Distinct from [`super::user::User`]: team
/// members are the technicians tickets get assigned to, appended from the
/// admin interface only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TeamMember {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TeamMember {
    pub const DEFAULT_ROLE: &'static str = "technician";
}
