use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// Ticket lifecycle state. The intended graph is linear:
/// `Open -> InProgress -> Closed`, and the lifecycle engine rejects every
/// other edge (including same-state updates and reopening).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TicketStatus {
    Open,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Closed,
}

impl TicketStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(TicketStatus::Open),
            "In Progress" => Some(TicketStatus::InProgress),
            "Closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Closed => "Closed",
        }
    }

    /// The only legal edges are the two in the linear lifecycle graph.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Open, TicketStatus::InProgress)
                | (TicketStatus::InProgress, TicketStatus::Closed)
        )
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency classification driving the target resolution window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Severity strings arrive from the client; anything unrecognized
    /// simply leaves the resolution window unset.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }

    /// Target resolution window in hours.
    pub fn window_hours(&self) -> i64 {
        match self {
            Severity::High => 4,
            Severity::Medium => 24,
            Severity::Low => 72,
        }
    }
}

/// A unit of reported IT work. `ticket_id` is the system-generated,
/// human-legible identifier (`GIT-xxxxxx-XXXXXX`) and is immutable once
/// assigned; rows are never deleted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ticket {
    pub ticket_id: String,
    pub employee_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub severity: String,
    pub supervisor_email: String,
    pub location: String,
    pub description: String,
    pub status: TicketStatus,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub time_to_resolve: Option<i64>,
    #[serde(serialize_with = "attachments_as_list")]
    pub attachments: Option<String>,
}

/// Attachment references are persisted comma-joined in a single TEXT
/// column but surfaced to clients as a JSON array.
fn attachments_as_list<S: Serializer>(v: &Option<String>, ser: S) -> Result<S::Ok, S::Error> {
    let list: Vec<&str> = match v {
        Some(s) if !s.is_empty() => s.split(',').collect(),
        _ => Vec::new(),
    };
    list.serialize(ser)
}

/// Ticket joined with its owner's directory details, for the admin view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub full_name: Option<String>,
    pub email: Option<String>,
}
