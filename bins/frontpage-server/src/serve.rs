use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use frontpage_api::Category;
use frontpage_api_server::AppState;
use frontpage_render::TemplateRenderer;
use frontpage_store::{ConfigStore, LogStore};

use crate::config::ServerConfig;
use crate::error::ServerError;

pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!("frontpage-server starting");

    // --- Assets ---
    let renderer = TemplateRenderer::from_paths(&config.template, config.font.as_deref())?;

    // --- Stores ---
    let store = ConfigStore::new(&config.config_path);
    let doc = store.get()?;
    let subjects: usize = Category::ALL.iter().map(|c| doc.subjects.get(*c).len()).sum();
    tracing::info!(
        path = %store.path().display(),
        subjects,
        streams = doc.streams.len(),
        "loaded admin config"
    );
    let logs = LogStore::new(&config.log_path);
    let generated = logs.count()?;
    tracing::info!(path = %logs.path().display(), generated, "opened generation log");

    let state = AppState::new(store, logs, Arc::new(renderer), config.admin_key.clone())?;
    if !state.admin_enabled() {
        tracing::warn!("ADMIN_API_KEY not set, admin API disabled");
    }

    // --- Serve until Ctrl+C / SIGTERM ---
    let token = CancellationToken::new();
    let serve = frontpage_api_server::run(config.addr, state, token.clone());
    tokio::pin!(serve);

    tokio::select! {
        res = &mut serve => return res.map_err(ServerError::Serve),
        sig = shutdown_signal() => {
            sig?;
            tracing::info!("shutting down...");
        }
    }

    token.cancel();
    serve.await.map_err(ServerError::Serve)
}

async fn shutdown_signal() -> Result<(), ServerError> {
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = term.recv() => {}
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}
