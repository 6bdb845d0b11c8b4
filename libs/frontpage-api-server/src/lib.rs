use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{middleware, Json, Router};
use minijinja::Environment;
use tokio_util::sync::CancellationToken;

use frontpage_api::FrontpageError;
use frontpage_render::DocumentRenderer;
use frontpage_store::{ConfigStore, LogStore};

mod admin;
mod error;
mod pages;

pub use admin::{ADMIN_KEY_HEADER, ADMIN_KEY_QUERY, DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
pub use error::ApiError;

/// Handles shared by every request. Stores re-read their files per call,
/// so nothing here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    config: ConfigStore,
    logs: LogStore,
    renderer: Arc<dyn DocumentRenderer>,
    admin_key: Option<Arc<str>>,
    pages: Arc<Environment<'static>>,
}

impl AppState {
    /// An empty or absent `admin_key` leaves the admin API disabled (403).
    pub fn new(
        config: ConfigStore,
        logs: LogStore,
        renderer: Arc<dyn DocumentRenderer>,
        admin_key: Option<String>,
    ) -> Result<Self, FrontpageError> {
        let admin_key = admin_key
            .filter(|k| !k.trim().is_empty())
            .map(Arc::from);
        Ok(Self {
            config,
            logs,
            renderer,
            admin_key,
            pages: Arc::new(pages::templates()?),
        })
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin_key.is_some()
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/admin/subjects",
            get(admin::list_subjects)
                .post(admin::add_subject)
                .put(admin::edit_subject)
                .delete(admin::delete_subject),
        )
        .route(
            "/admin/streams",
            get(admin::list_streams)
                .post(admin::add_stream)
                .delete(admin::delete_stream),
        )
        .route("/admin/logs", get(admin::recent_logs))
        .route("/admin/config", get(admin::config_snapshot))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin_key,
        ));

    Router::new()
        .route("/", get(pages::index))
        .route("/frontpages", get(pages::form).post(pages::generate))
        .route("/admin/dashboard", get(pages::dashboard))
        .route("/api/stats", get(handle_stats))
        .route("/healthz", get(|| async { "ok" }))
        .merge(admin)
        .with_state(state)
}

/// Serve until `shutdown` is cancelled.
pub async fn run(
    addr: SocketAddr,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), String> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("bind {addr}: {e}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}

// --- REST: GET /api/stats ---

async fn handle_stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let total = state.logs.count()?;
    Ok(Json(serde_json::json!({ "total": total })))
}
