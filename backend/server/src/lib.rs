//! Documentation of a civic road-damage complaint service.
//!
//! # General Infrastructure
//! - Citizens submit pothole reports and get back a reference id like `FMR-2025-48213`
//! - Citizens track a reference id to see its status and a progress timeline
//! - A moderator lists, advances and deletes complaints
//! - All record state lives in Redis, handlers hold nothing between requests
//!
//!
//!
//! # Status Lifecycle
//!
//! `Submitted` → `Assigned` → `Resolved`, forward only. `Assigned` may be skipped.
//! Anything else is refused with `409 Conflict` and the record is left as it was.
//!
//! Only `createdAt` and `updatedAt` are stored. The timeline shown to citizens is rebuilt from
//! those two instants, see [`records::timeline`].
//!
//!
//!
//! # API
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /api/login` | [`routes::login_handler`] |
//! | `POST /api/complaints` | [`routes::submit_handler`] |
//! | `GET /api/complaints/{refId}` | [`routes::track_handler`] |
//! | `GET /api/stats` | [`routes::stats_handler`] |
//! | `GET /api/all-complaints?status=` | [`routes::all_complaints_handler`] |
//! | `POST /api/update-status` | [`routes::update_status_handler`] |
//! | `DELETE /api/delete-complaint/{refId}` | [`routes::delete_handler`] |
//!
//! Everything else falls through to the static front end in `STATIC_DIR`.
//!
//! Failures always answer `{ "success": false, "error": ... }`, login failures use `message`.
//!
//!
//!
//! # Notes
//!
//! ## Moderator login
//! The login check is a fixed credential pair and issues no session. Moderator routes are not
//! gated by it. Needs a real credential store and session tokens before facing the internet.
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! MODERATOR_PASSWORD=changeme RUST_LOG=info cargo run -p fixmyroad
//! ```
//!
//! Run without Redis, records are lost on exit.
//! ```sh
//! REDIS_URL=memory:// MODERATOR_PASSWORD=changeme cargo run -p fixmyroad
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{delete, get, post},
};

use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod lifecycle;
pub mod refid;
pub mod routes;
pub mod state;
pub mod store;

use routes::{
    all_complaints_handler, delete_handler, login_handler, stats_handler, submit_handler,
    track_handler, update_status_handler,
};
use state::State;

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/login", post(login_handler))
        .route("/api/complaints", post(submit_handler))
        .route("/api/complaints/{ref_id}", get(track_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/all-complaints", get(all_complaints_handler))
        .route("/api/update-status", post(update_status_handler))
        .route("/api/delete-complaint/{ref_id}", delete(delete_handler))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
