use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Outbound mail transport seam. Delivery is an external collaborator;
/// the included implementation just logs the rendered message. A real
/// SMTP transport takes its parameters from [`crate::config::SmtpConfig`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Stand-in transport: records the message in the log and reports success.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        info!(to = %to, subject = %subject, "outbound notification (log transport)");
        Ok(())
    }
}

/// Supervisor notification rendered on ticket creation.
#[derive(Debug, Clone)]
pub struct TicketNotification {
    pub ticket_id: String,
    pub ticket_type: String,
    pub severity: String,
    pub requester_name: String,
    pub requester_id: String,
    pub location: String,
    pub description: String,
    pub supervisor_email: String,
}

impl TicketNotification {
    fn subject(&self) -> String {
        format!("New IT Ticket: {} - {}", self.ticket_id, self.ticket_type)
    }

    fn body(&self) -> String {
        format!(
            "New IT Support Ticket\n\
             Ticket ID: {}\n\
             Type: {}\n\
             Severity: {}\n\
             Requested by: {} ({})\n\
             Location: {}\n\
             Description: {}\n\
             Please review and assign this ticket to an appropriate team member.",
            self.ticket_id,
            self.ticket_type,
            self.severity,
            self.requester_name,
            self.requester_id,
            self.location,
            self.description,
        )
    }
}

/// Fire-and-forget notification dispatcher: a bounded queue drained by one
/// worker task. Failures are logged and never surfaced to the caller, and
/// nothing is retried.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<TicketNotification>,
}

impl Notifier {
    pub fn spawn(mailer: Arc<dyn Mailer>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<TicketNotification>(capacity);

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let to = notification.supervisor_email.clone();
                if let Err(e) = mailer
                    .send(&to, &notification.subject(), &notification.body())
                    .await
                {
                    error!(
                        ticket = %notification.ticket_id,
                        to = %to,
                        "notification delivery failed: {}", e
                    );
                }
            }
        });

        Self { tx }
    }

    /// Best-effort enqueue; a full or closed queue drops the notification
    /// with a log line.
    pub fn enqueue(&self, notification: TicketNotification) {
        if let Err(e) = self.tx.try_send(notification) {
            warn!("dropping ticket notification: {}", e);
        }
    }
}
