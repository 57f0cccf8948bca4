//! In-memory store fake for unit tests. Mirrors the SQLite semantics the
//! lifecycle engine depends on: unique ticket ids, zero-row updates on
//! unknown ids, newest-first ordering.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::auth::directory::DirectoryProfile;
use crate::database::models::{Setting, TeamMember, Ticket, TicketStatus, TicketWithOwner, User};
use crate::database::store::{Store, StoreError, TicketCounts};

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    tickets: Vec<Ticket>,
    settings: HashMap<String, Setting>,
    members: Vec<TeamMember>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn upsert_user(&self, profile: &DirectoryProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.users.insert(
            profile.employee_id.clone(),
            User {
                employee_id: profile.employee_id.clone(),
                username: profile.username.clone(),
                email: profile.email.clone(),
                full_name: profile.full_name.clone(),
                department: profile.department.clone(),
                role: profile.role,
                supervisor_email: profile.supervisor_email.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn find_user(&self, employee_id: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(employee_id).cloned())
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.tickets.iter().any(|t| t.ticket_id == ticket.ticket_id) {
            return Err(StoreError::UniqueViolation(ticket.ticket_id.clone()));
        }
        inner.tickets.push(ticket.clone());
        Ok(())
    }

    async fn find_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.tickets.iter().find(|t| t.ticket_id == ticket_id).cloned())
    }

    async fn tickets_for_owner(&self, employee_id: &str) -> Result<Vec<Ticket>, StoreError> {
        let inner = self.inner.lock().await;
        let mut tickets: Vec<Ticket> = inner
            .tickets
            .iter()
            .filter(|t| t.employee_id == employee_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn tickets_with_owners(&self) -> Result<Vec<TicketWithOwner>, StoreError> {
        let inner = self.inner.lock().await;
        let mut tickets: Vec<TicketWithOwner> = inner
            .tickets
            .iter()
            .map(|t| {
                let owner = inner.users.get(&t.employee_id);
                TicketWithOwner {
                    ticket: t.clone(),
                    full_name: owner.map(|u| u.full_name.clone()),
                    email: owner.map(|u| u.email.clone()),
                }
            })
            .collect();
        tickets.sort_by(|a, b| b.ticket.created_at.cmp(&a.ticket.created_at));
        Ok(tickets)
    }

    async fn update_ticket_status(
        &self,
        ticket_id: &str,
        status: TicketStatus,
        resolved_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.tickets.iter_mut().find(|t| t.ticket_id == ticket_id) {
            Some(ticket) => {
                ticket.status = status;
                ticket.resolved_at = resolved_at;
                ticket.updated_at = updated_at;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn assign_ticket(
        &self,
        ticket_id: &str,
        assigned_to: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.tickets.iter_mut().find(|t| t.ticket_id == ticket_id) {
            Some(ticket) => {
                ticket.assigned_to = Some(assigned_to.to_string());
                ticket.status = TicketStatus::InProgress;
                ticket.updated_at = updated_at;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ticket_counts(&self) -> Result<TicketCounts, StoreError> {
        let inner = self.inner.lock().await;
        let count = |s: TicketStatus| inner.tickets.iter().filter(|t| t.status == s).count() as i64;
        Ok(TicketCounts {
            total: inner.tickets.len() as i64,
            open: count(TicketStatus::Open),
            in_progress: count(TicketStatus::InProgress),
            closed: count(TicketStatus::Closed),
        })
    }

    async fn settings(&self) -> Result<Vec<Setting>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.settings.values().cloned().collect())
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.settings.insert(
            key.to_string(),
            Setting {
                key: key.to_string(),
                value: value.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn team_members(&self) -> Result<Vec<TeamMember>, StoreError> {
        let inner = self.inner.lock().await;
        let mut members = inner.members.clone();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    async fn add_team_member(&self, member: &TeamMember) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.members.iter().any(|m| m.employee_id == member.employee_id) {
            return Err(StoreError::UniqueViolation(member.employee_id.clone()));
        }
        inner.members.push(member.clone());
        Ok(())
    }
}
