use std::sync::Arc;

use axum::{extract::Extension, middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use graviti_helpdesk::auth::directory::StubDirectory;
use graviti_helpdesk::config::{self, AppConfig};
use graviti_helpdesk::database::SqliteStore;
use graviti_helpdesk::middleware::require_auth;
use graviti_helpdesk::services::notify::{LogMailer, Notifier};
use graviti_helpdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Mandatory configuration; startup fails here rather than serving with
    // an insecure fallback secret.
    let config = config::init(AppConfig::from_env()?);

    let store = SqliteStore::connect(&config.database_url).await?;
    let notifier = Notifier::spawn(Arc::new(LogMailer), config.notify_queue);
    let state = AppState::new(Arc::new(store), Arc::new(StubDirectory), notifier);

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Graviti Helpdesk listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(ticket_routes())
        .merge(admin_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use graviti_helpdesk::handlers::auth;

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        // Token acquisition stays public
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
}

fn ticket_routes() -> Router {
    use axum::routing::{post, put};
    use graviti_helpdesk::handlers::tickets;

    Router::new()
        .route("/api/tickets/create", post(tickets::create))
        .route("/api/tickets/my-tickets", get(tickets::my_tickets))
        .route("/api/tickets/all", get(tickets::all_tickets))
        .route("/api/tickets/:ticket_id/status", put(tickets::update_status))
        .route("/api/tickets/:ticket_id/assign", put(tickets::assign))
        .route_layer(middleware::from_fn(require_auth))
}

fn admin_routes() -> Router {
    use axum::routing::{get, post};
    use graviti_helpdesk::handlers::admin;

    Router::new()
        .route("/api/admin/dashboard-stats", get(admin::dashboard_stats))
        .route(
            "/api/admin/team-members",
            get(admin::team_members).post(admin::add_team_member),
        )
        .route(
            "/api/admin/settings",
            get(admin::settings).post(admin::update_settings),
        )
        .route_layer(middleware::from_fn(require_auth))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Graviti Helpdesk (Rust)",
            "version": version,
            "description": "Internal IT-support ticketing API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/auth/login (public), /api/auth/me (bearer)",
                "tickets": "/api/tickets/* (bearer)",
                "admin": "/api/admin/* (bearer, admin role)",
            }
        }
    }))
}

async fn health(Extension(state): Extension<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "message": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
