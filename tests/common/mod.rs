use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
    // Keeps the SQLite file alive for the server's lifetime.
    #[allow(dead_code)]
    db_dir: tempfile::TempDir,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let db_dir = tempfile::tempdir().context("failed to create db dir")?;
        let db_path = db_dir.path().join("helpdesk.db");

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/graviti-helpdesk");
        cmd.env("HELPDESK_PORT", port.to_string())
            .env("HELPDESK_JWT_SECRET", "integration-test-secret")
            .env("DATABASE_URL", format!("sqlite://{}", db_path.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            base_url,
            child,
            db_dir,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Log in and return the bearer token.
#[allow(dead_code)]
pub async fn login(server: &TestServer, username: &str, password: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body: serde_json::Value = res.json().await?;
    body["token"]
        .as_str()
        .map(ToString::to_string)
        .context("login response missing token")
}

/// File a ticket over multipart and return the generated ticket id.
#[allow(dead_code)]
pub async fn create_ticket(
    server: &TestServer,
    token: &str,
    severity: &str,
    description: &str,
) -> Result<String> {
    let form = reqwest::multipart::Form::new()
        .text("type", "Hardware")
        .text("severity", severity.to_string())
        .text("supervisor_email", "supervisor@graviti.com")
        .text("location", "HQ / Floor 2")
        .text("description", description.to_string());

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/tickets/create", server.base_url))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "create failed: {}", res.status());

    let body: serde_json::Value = res.json().await?;
    body["ticket_id"]
        .as_str()
        .map(ToString::to_string)
        .context("create response missing ticket_id")
}
