use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::auth::directory::DirectoryProfile;
use crate::database::models::{Setting, TeamMember, Ticket, TicketStatus, TicketWithOwner, User};

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Dashboard aggregate: four independent counts over the ticket table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TicketCounts {
    pub total: i64,
    pub open: i64,
    #[serde(rename = "inProgress")]
    pub in_progress: i64,
    pub closed: i64,
}

/// Storage capability injected into every component at construction.
///
/// The store is the single source of truth: nothing above it caches rows,
/// every read and write round-trips here. Each method is a single-statement
/// operation; no multi-statement transaction ever wraps a sequence.
#[async_trait]
pub trait Store: Send + Sync {
    /// Liveness probe for /health.
    async fn ping(&self) -> Result<(), StoreError>;

    // Users -------------------------------------------------------------

    /// Insert-or-replace the profile row. Login is the sole caller.
    async fn upsert_user(&self, profile: &DirectoryProfile) -> Result<(), StoreError>;

    async fn find_user(&self, employee_id: &str) -> Result<Option<User>, StoreError>;

    // Tickets -----------------------------------------------------------

    /// Insert a new ticket row. Fails with [`StoreError::UniqueViolation`]
    /// when the generated ticket id already exists.
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), StoreError>;

    async fn find_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, StoreError>;

    /// Tickets owned by one employee, newest first.
    async fn tickets_for_owner(&self, employee_id: &str) -> Result<Vec<Ticket>, StoreError>;

    /// Every ticket joined with its owner's name and email, newest first.
    async fn tickets_with_owners(&self) -> Result<Vec<TicketWithOwner>, StoreError>;

    /// Set status/resolved_at/updated_at on one ticket. Returns the number
    /// of rows affected; zero means the ticket id is unknown.
    async fn update_ticket_status(
        &self,
        ticket_id: &str,
        status: TicketStatus,
        resolved_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Set the assignee and force status to In Progress. Returns rows
    /// affected; zero means the ticket id is unknown.
    async fn assign_ticket(
        &self,
        ticket_id: &str,
        assigned_to: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    async fn ticket_counts(&self) -> Result<TicketCounts, StoreError>;

    // Settings ----------------------------------------------------------

    async fn settings(&self) -> Result<Vec<Setting>, StoreError>;

    /// Per-key upsert, refreshing the row's updated_at. No deletion path.
    async fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;

    // Team members ------------------------------------------------------

    async fn team_members(&self) -> Result<Vec<TeamMember>, StoreError>;

    /// Append to the roster. Fails with [`StoreError::UniqueViolation`] on
    /// a duplicate employee id.
    async fn add_team_member(&self, member: &TeamMember) -> Result<(), StoreError>;
}
