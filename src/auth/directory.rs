use async_trait::async_trait;
use serde::Serialize;

use crate::auth::AuthError;
use crate::database::models::Role;

/// Canonical profile returned by the directory on a successful bind.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryProfile {
    pub employee_id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub department: String,
    pub role: Role,
    pub supervisor_email: Option<String>,
}

/// Credential verification against the corporate directory. The rest of
/// the system only depends on this contract: profile on success,
/// [`AuthError::InvalidCredential`] on failure.
#[async_trait]
pub trait DirectoryAuthenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<DirectoryProfile, AuthError>;
}

/// Placeholder directory recognizing exactly two account patterns.
///
/// Replace with a real LDAP bind + search in production; the connection
/// parameters live on [`crate::config::LdapConfig`].
pub struct StubDirectory;

#[async_trait]
impl DirectoryAuthenticator for StubDirectory {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<DirectoryProfile, AuthError> {
        if username == "admin" && password == "admin123" {
            return Ok(DirectoryProfile {
                employee_id: "ADMIN001".to_string(),
                username: username.to_string(),
                email: "admin@graviti.com".to_string(),
                full_name: "System Administrator".to_string(),
                department: "IT".to_string(),
                role: Role::Admin,
                supervisor_email: None,
            });
        }

        if username.starts_with("emp") && password == "password123" {
            return Ok(DirectoryProfile {
                employee_id: username.to_uppercase(),
                username: username.to_string(),
                email: format!("{}@graviti.com", username),
                full_name: format!("Employee {}", username),
                department: "General".to_string(),
                role: Role::User,
                supervisor_email: Some("supervisor@graviti.com".to_string()),
            });
        }

        Err(AuthError::InvalidCredential)
    }
}
