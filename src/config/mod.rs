use once_cell::sync::OnceCell;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
}

/// Process configuration, loaded once from the environment at startup.
///
/// The JWT secret and database URL are mandatory: there is deliberately no
/// insecure fallback, and startup fails before a socket is bound when
/// either is absent.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub notify_queue: usize,
    pub ldap: LdapConfig,
    pub smtp: SmtpConfig,
}

/// Directory connection parameters, consumed by a real LDAP
/// implementation of the directory authenticator.
#[derive(Debug, Clone, Default)]
pub struct LdapConfig {
    pub url: Option<String>,
    pub bind_dn: Option<String>,
    pub bind_password: Option<String>,
    pub search_base: Option<String>,
}

/// Outbound mail parameters, consumed by a real SMTP mail transport.
#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub from: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = required("HELPDESK_JWT_SECRET")?;
        let database_url = required("DATABASE_URL")?;

        let port = env::var("HELPDESK_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let jwt_expiry_hours = env::var("HELPDESK_JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8);

        let notify_queue = env::var("HELPDESK_NOTIFY_QUEUE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64);

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            jwt_expiry_hours,
            notify_queue,
            ldap: LdapConfig {
                url: env::var("LDAP_URL").ok(),
                bind_dn: env::var("LDAP_BIND_DN").ok(),
                bind_password: env::var("LDAP_BIND_PASSWORD").ok(),
                search_base: env::var("LDAP_SEARCH_BASE").ok(),
            },
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").ok(),
                port: env::var("SMTP_PORT").ok().and_then(|s| s.parse().ok()),
                user: env::var("SMTP_USER").ok(),
                pass: env::var("SMTP_PASS").ok(),
                from: env::var("SMTP_FROM").ok(),
            },
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}

// Global singleton config - initialized once at startup
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Install the loaded configuration. Later calls are ignored.
pub fn init(config: AppConfig) -> &'static AppConfig {
    CONFIG.get_or_init(|| config)
}

/// Access the installed configuration. Panics if [`init`] never ran,
/// which only happens on a programming error in bootstrap.
pub fn config() -> &'static AppConfig {
    CONFIG.get().expect("configuration not initialized")
}
