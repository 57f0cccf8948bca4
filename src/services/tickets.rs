use std::sync::Arc;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;
use tracing::info;

use crate::database::models::{Severity, Ticket, TicketStatus, TicketWithOwner, User};
use crate::database::store::{Store, StoreError, TicketCounts};
use crate::services::notify::{Notifier, TicketNotification};

/// How many ticket ids to try before giving up. The id embeds a millisecond
/// stamp plus six random characters, so a second collision is already
/// vanishingly unlikely.
const ID_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("ticket not found: {0}")]
    NotFound(String),

    #[error("invalid status transition: {0} -> {1}")]
    InvalidTransition(TicketStatus, TicketStatus),

    #[error("cannot assign a closed ticket: {0}")]
    AssignClosed(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("could not allocate a unique ticket id")]
    IdExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields supplied by the employee filing a ticket.
#[derive(Debug, Default)]
pub struct NewTicketInput {
    pub ticket_type: String,
    pub severity: String,
    pub supervisor_email: String,
    pub location: String,
    pub description: String,
    pub attachments: Vec<String>,
}

/// The ticket lifecycle engine: creation, the status transition graph,
/// assignment, resolution-time accounting, and the dashboard counts.
/// Works purely against the injected store; never caches ticket state.
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn Store>,
    notifier: Notifier,
}

impl TicketService {
    pub fn new(store: Arc<dyn Store>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// File a new ticket for `owner`. Returns the generated ticket id
    /// without waiting on notification delivery.
    pub async fn create(&self, owner: &User, input: NewTicketInput) -> Result<String, TicketError> {
        for (field, value) in [
            ("type", &input.ticket_type),
            ("severity", &input.severity),
            ("supervisor_email", &input.supervisor_email),
            ("location", &input.location),
            ("description", &input.description),
        ] {
            if value.trim().is_empty() {
                return Err(TicketError::MissingField(field));
            }
        }

        // Unknown severities get no resolution window rather than failing.
        let time_to_resolve = Severity::parse(&input.severity).map(|s| s.window_hours());

        let attachments = if input.attachments.is_empty() {
            None
        } else {
            Some(input.attachments.join(","))
        };

        // The UNIQUE constraint on ticket_id is the real collision guard;
        // regenerate and retry when it trips.
        let mut created = None;
        for _ in 0..ID_ATTEMPTS {
            let now = Utc::now();
            let ticket = Ticket {
                ticket_id: generate_ticket_id(),
                employee_id: owner.employee_id.clone(),
                ticket_type: input.ticket_type.clone(),
                severity: input.severity.clone(),
                supervisor_email: input.supervisor_email.clone(),
                location: input.location.clone(),
                description: input.description.clone(),
                status: TicketStatus::Open,
                assigned_to: None,
                created_at: now,
                updated_at: now,
                resolved_at: None,
                time_to_resolve,
                attachments: attachments.clone(),
            };

            match self.store.insert_ticket(&ticket).await {
                Ok(()) => {
                    created = Some(ticket.ticket_id);
                    break;
                }
                Err(StoreError::UniqueViolation(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let ticket_id = created.ok_or(TicketError::IdExhausted)?;

        info!(ticket = %ticket_id, owner = %owner.employee_id, "ticket created");

        self.notifier.enqueue(TicketNotification {
            ticket_id: ticket_id.clone(),
            ticket_type: input.ticket_type,
            severity: input.severity,
            requester_name: owner.full_name.clone(),
            requester_id: owner.employee_id.clone(),
            location: input.location,
            description: input.description,
            supervisor_email: input.supervisor_email,
        });

        Ok(ticket_id)
    }

    /// Tickets owned by one employee, newest first.
    pub async fn owned_by(&self, employee_id: &str) -> Result<Vec<Ticket>, TicketError> {
        Ok(self.store.tickets_for_owner(employee_id).await?)
    }

    /// Every ticket joined with owner details, newest first. The role gate
    /// lives in the handler; this is pure data access.
    pub async fn all_with_owners(&self) -> Result<Vec<TicketWithOwner>, TicketError> {
        Ok(self.store.tickets_with_owners().await?)
    }

    /// Move a ticket along the lifecycle graph. Closing stamps
    /// `resolved_at`; any other target clears it; `updated_at` always
    /// advances.
    pub async fn update_status(
        &self,
        ticket_id: &str,
        next: TicketStatus,
    ) -> Result<(), TicketError> {
        let ticket = self
            .store
            .find_ticket(ticket_id)
            .await?
            .ok_or_else(|| TicketError::NotFound(ticket_id.to_string()))?;

        if !ticket.status.can_transition_to(next) {
            return Err(TicketError::InvalidTransition(ticket.status, next));
        }

        let now = Utc::now();
        let resolved_at = (next == TicketStatus::Closed).then_some(now);

        let rows = self
            .store
            .update_ticket_status(ticket_id, next, resolved_at, now)
            .await?;
        if rows == 0 {
            // Row vanished between read and write.
            return Err(TicketError::NotFound(ticket_id.to_string()));
        }

        info!(ticket = %ticket_id, status = %next, "ticket status updated");
        Ok(())
    }

    /// Assign a ticket to a team member, forcing it In Progress. Closed
    /// tickets are final and cannot be assigned.
    pub async fn assign(&self, ticket_id: &str, assigned_to: &str) -> Result<(), TicketError> {
        if assigned_to.trim().is_empty() {
            return Err(TicketError::MissingField("assigned_to"));
        }

        let ticket = self
            .store
            .find_ticket(ticket_id)
            .await?
            .ok_or_else(|| TicketError::NotFound(ticket_id.to_string()))?;

        if ticket.status == TicketStatus::Closed {
            return Err(TicketError::AssignClosed(ticket_id.to_string()));
        }

        let rows = self
            .store
            .assign_ticket(ticket_id, assigned_to, Utc::now())
            .await?;
        if rows == 0 {
            return Err(TicketError::NotFound(ticket_id.to_string()));
        }

        info!(ticket = %ticket_id, assignee = %assigned_to, "ticket assigned");
        Ok(())
    }

    pub async fn counts(&self) -> Result<TicketCounts, TicketError> {
        Ok(self.store.ticket_counts().await?)
    }
}

/// `GIT-<last six digits of unix-millis>-<six uppercase alnum>`.
fn generate_ticket_id() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let stamp = &millis[millis.len().saturating_sub(6)..];
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("GIT-{}-{}", stamp, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::database::memory::MemoryStore;
    use crate::database::models::Role;
    use crate::services::notify::LogMailer;

    fn owner() -> User {
        User {
            employee_id: "EMP007".into(),
            username: "emp007".into(),
            email: "emp007@graviti.com".into(),
            full_name: "Employee emp007".into(),
            department: "General".into(),
            role: Role::User,
            supervisor_email: Some("supervisor@graviti.com".into()),
            created_at: Utc::now(),
        }
    }

    fn input(severity: &str) -> NewTicketInput {
        NewTicketInput {
            ticket_type: "Hardware".into(),
            severity: severity.into(),
            supervisor_email: "supervisor@graviti.com".into(),
            location: "HQ / Floor 2".into(),
            description: "Monitor flickers".into(),
            attachments: vec![],
        }
    }

    fn service(store: Arc<MemoryStore>) -> TicketService {
        TicketService::new(store, Notifier::spawn(Arc::new(LogMailer), 8))
    }

    fn assert_id_shape(id: &str) {
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3, "unexpected id shape: {}", id);
        assert_eq!(parts[0], "GIT");
        assert_eq!(parts[1].len(), 6);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric() && !c.is_lowercase()));
    }

    #[test]
    fn generated_ids_match_pattern() {
        for _ in 0..100 {
            assert_id_shape(&generate_ticket_id());
        }
    }

    #[tokio::test]
    async fn create_sets_window_from_severity() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        for (severity, hours) in [("High", 4), ("Medium", 24), ("Low", 72)] {
            let id = svc.create(&owner(), input(severity)).await.unwrap();
            let ticket = store.find_ticket(&id).await.unwrap().unwrap();
            assert_eq!(ticket.time_to_resolve, Some(hours));
            assert_eq!(ticket.status, TicketStatus::Open);
            assert!(ticket.resolved_at.is_none());
            assert_id_shape(&id);
        }
    }

    #[tokio::test]
    async fn unknown_severity_leaves_window_unset() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let id = svc.create(&owner(), input("Catastrophic")).await.unwrap();
        let ticket = store.find_ticket(&id).await.unwrap().unwrap();
        assert_eq!(ticket.time_to_resolve, None);
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let svc = service(Arc::new(MemoryStore::new()));

        let mut bad = input("Low");
        bad.description = "   ".into();
        assert!(matches!(
            svc.create(&owner(), bad).await,
            Err(TicketError::MissingField("description"))
        ));
    }

    #[tokio::test]
    async fn distinct_creations_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);

        let mut ids = std::collections::HashSet::new();
        for _ in 0..20 {
            assert!(ids.insert(svc.create(&owner(), input("Low")).await.unwrap()));
        }
    }

    #[tokio::test]
    async fn lifecycle_stamps_and_clears_resolution() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let id = svc.create(&owner(), input("Low")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2)).await;
        svc.update_status(&id, TicketStatus::InProgress).await.unwrap();
        let ticket = store.find_ticket(&id).await.unwrap().unwrap();
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert!(ticket.resolved_at.is_none());
        assert!(ticket.updated_at > ticket.created_at);
        let after_progress = ticket.updated_at;

        tokio::time::sleep(Duration::from_millis(2)).await;
        svc.update_status(&id, TicketStatus::Closed).await.unwrap();
        let ticket = store.find_ticket(&id).await.unwrap().unwrap();
        assert_eq!(ticket.status, TicketStatus::Closed);
        assert!(ticket.resolved_at.is_some());
        assert!(ticket.updated_at > after_progress);
    }

    #[tokio::test]
    async fn off_graph_transitions_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let id = svc.create(&owner(), input("High")).await.unwrap();

        // Open -> Closed skips a state.
        assert!(matches!(
            svc.update_status(&id, TicketStatus::Closed).await,
            Err(TicketError::InvalidTransition(TicketStatus::Open, TicketStatus::Closed))
        ));
        // Row untouched.
        let ticket = store.find_ticket(&id).await.unwrap().unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);

        svc.update_status(&id, TicketStatus::InProgress).await.unwrap();
        svc.update_status(&id, TicketStatus::Closed).await.unwrap();

        // Closed is final.
        assert!(matches!(
            svc.update_status(&id, TicketStatus::Open).await,
            Err(TicketError::InvalidTransition(_, _))
        ));
    }

    #[tokio::test]
    async fn unknown_ticket_is_not_found() {
        let svc = service(Arc::new(MemoryStore::new()));

        assert!(matches!(
            svc.update_status("GIT-000000-ZZZZZZ", TicketStatus::InProgress).await,
            Err(TicketError::NotFound(_))
        ));
        assert!(matches!(
            svc.assign("GIT-000000-ZZZZZZ", "TECH01").await,
            Err(TicketError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn assign_forces_in_progress_and_rejects_closed() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let id = svc.create(&owner(), input("Medium")).await.unwrap();

        svc.assign(&id, "TECH01").await.unwrap();
        let ticket = store.find_ticket(&id).await.unwrap().unwrap();
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.assigned_to.as_deref(), Some("TECH01"));

        svc.update_status(&id, TicketStatus::Closed).await.unwrap();
        assert!(matches!(
            svc.assign(&id, "TECH02").await,
            Err(TicketError::AssignClosed(_))
        ));
        let ticket = store.find_ticket(&id).await.unwrap().unwrap();
        assert_eq!(ticket.assigned_to.as_deref(), Some("TECH01"));
    }

    #[tokio::test]
    async fn counts_track_statuses() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let a = svc.create(&owner(), input("Low")).await.unwrap();
        let _b = svc.create(&owner(), input("High")).await.unwrap();
        svc.assign(&a, "TECH01").await.unwrap();

        let counts = svc.counts().await.unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.open, 1);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.closed, 0);
    }

    #[tokio::test]
    async fn owned_list_is_newest_first_and_scoped() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let first = svc.create(&owner(), input("Low")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = svc.create(&owner(), input("High")).await.unwrap();

        let mut other = owner();
        other.employee_id = "EMP008".into();
        svc.create(&other, input("Medium")).await.unwrap();

        let mine = svc.owned_by("EMP007").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].ticket_id, second);
        assert_eq!(mine[1].ticket_id, first);
    }
}
