use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{file::issue_store::IssueStore, runtime};

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the issue store into the router according to `cfg`.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let static_dir = cfg.web.static_dir.as_deref();
    runtime::ensure_env(static_dir, &cfg.storage.data_file).await?;

    let store = IssueStore::new(cfg.storage.data_file.clone()).await?;
    info!(data_file = %cfg.storage.data_file.display(), "issue store ready");

    let state = AppState::new(store);
    Ok(routes::build_router(state, build_cors(), static_dir))
}

/// Serve the app on `cfg.server` until Ctrl+C, letting in-flight requests finish.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StartupError::Bind(format!("{addr}: {e}")))?;
    info!(addr = %listener.local_addr()?, "starting issue tracker");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, draining connections");
        })
        .await?;
    Ok(())
}
