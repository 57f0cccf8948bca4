use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::auth::directory::DirectoryProfile;
use crate::database::models::{Setting, TeamMember, Ticket, TicketStatus, TicketWithOwner, User};
use crate::database::store::{Store, StoreError, TicketCounts};

/// SQLite-backed store. The schema is created and seeded on first boot:
/// one admin account plus the three default setting rows.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("SQLite store ready at {}", database_url);
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id TEXT UNIQUE,
                username TEXT UNIQUE,
                email TEXT,
                full_name TEXT,
                department TEXT,
                role TEXT DEFAULT 'user',
                supervisor_email TEXT,
                created_at TEXT
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id TEXT UNIQUE,
                employee_id TEXT,
                type TEXT,
                severity TEXT,
                supervisor_email TEXT,
                location TEXT,
                description TEXT,
                status TEXT DEFAULT 'Open',
                assigned_to TEXT,
                created_at TEXT,
                updated_at TEXT,
                resolved_at TEXT,
                time_to_resolve INTEGER,
                attachments TEXT,
                FOREIGN KEY (employee_id) REFERENCES users(employee_id)
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT UNIQUE,
                value TEXT,
                updated_at TEXT
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS team_members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id TEXT UNIQUE,
                name TEXT,
                email TEXT,
                department TEXT,
                role TEXT DEFAULT 'technician',
                created_at TEXT
            )"#,
        )
        .execute(&self.pool)
        .await?;

        self.seed().await
    }

    async fn seed(&self) -> Result<(), StoreError> {
        let now = Utc::now();

        sqlx::query(
            r#"INSERT OR IGNORE INTO users
                (employee_id, username, email, full_name, department, role, created_at)
                VALUES ('ADMIN001', 'admin', 'admin@graviti.com',
                        'System Administrator', 'IT', 'admin', ?1)"#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        for (key, value) in [
            ("company_name", "Graviti Pharmaceuticals"),
            ("company_logo", "default-logo.png"),
            ("admin_password_changed", "false"),
        ] {
            sqlx::query("INSERT OR IGNORE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)")
                .bind(key)
                .bind(value)
                .bind(now)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }
}

/// Map SQLite constraint failures onto the store's conflict variant so the
/// layers above can distinguish duplicates from genuine failures.
fn map_sqlx(err: sqlx::Error, key: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation(key.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_user(&self, profile: &DirectoryProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO users
                (employee_id, username, email, full_name, department, role, supervisor_email, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        )
        .bind(&profile.employee_id)
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.department)
        .bind(profile.role)
        .bind(&profile.supervisor_email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user(&self, employee_id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE employee_id = ?1")
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO tickets
                (ticket_id, employee_id, type, severity, supervisor_email, location,
                 description, status, assigned_to, created_at, updated_at, resolved_at,
                 time_to_resolve, attachments)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"#,
        )
        .bind(&ticket.ticket_id)
        .bind(&ticket.employee_id)
        .bind(&ticket.ticket_type)
        .bind(&ticket.severity)
        .bind(&ticket.supervisor_email)
        .bind(&ticket.location)
        .bind(&ticket.description)
        .bind(ticket.status)
        .bind(&ticket.assigned_to)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .bind(ticket.resolved_at)
        .bind(ticket.time_to_resolve)
        .bind(&ticket.attachments)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, &ticket.ticket_id))?;
        Ok(())
    }

    async fn find_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, StoreError> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE ticket_id = ?1")
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn tickets_for_owner(&self, employee_id: &str) -> Result<Vec<Ticket>, StoreError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE employee_id = ?1 ORDER BY created_at DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    async fn tickets_with_owners(&self) -> Result<Vec<TicketWithOwner>, StoreError> {
        let tickets = sqlx::query_as::<_, TicketWithOwner>(
            r#"SELECT t.*, u.full_name, u.email
               FROM tickets t
               LEFT JOIN users u ON t.employee_id = u.employee_id
               ORDER BY t.created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    async fn update_ticket_status(
        &self,
        ticket_id: &str,
        status: TicketStatus,
        resolved_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE tickets SET status = ?1, resolved_at = ?2, updated_at = ?3 WHERE ticket_id = ?4",
        )
        .bind(status)
        .bind(resolved_at)
        .bind(updated_at)
        .bind(ticket_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn assign_ticket(
        &self,
        ticket_id: &str,
        assigned_to: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE tickets SET assigned_to = ?1, status = 'In Progress', updated_at = ?2 WHERE ticket_id = ?3",
        )
        .bind(assigned_to)
        .bind(updated_at)
        .bind(ticket_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn ticket_counts(&self) -> Result<TicketCounts, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
            .fetch_one(&self.pool)
            .await?;

        let mut by_status = [0i64; 3];
        for (slot, status) in by_status.iter_mut().zip([
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Closed,
        ]) {
            *slot = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE status = ?1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        }

        Ok(TicketCounts {
            total,
            open: by_status[0],
            in_progress: by_status[1],
            closed: by_status[2],
        })
    }

    async fn settings(&self) -> Result<Vec<Setting>, StoreError> {
        let settings =
            sqlx::query_as::<_, Setting>("SELECT key, value, updated_at FROM settings")
                .fetch_all(&self.pool)
                .await?;
        Ok(settings)
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn team_members(&self) -> Result<Vec<TeamMember>, StoreError> {
        let members = sqlx::query_as::<_, TeamMember>(
            "SELECT employee_id, name, email, department, role, created_at FROM team_members ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn add_team_member(&self, member: &TeamMember) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO team_members (employee_id, name, email, department, role, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )
        .bind(&member.employee_id)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.department)
        .bind(&member.role)
        .bind(member.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, &member.employee_id))?;
        Ok(())
    }
}
