use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One row of the key/value configuration map (company name, logo, flags).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
