// HTTP backend service: metadata, one-shot downloads and a health probe

mod error;
mod handlers;
mod routes;

pub use error::{HttpError, ServerError};
pub use routes::create_router;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::downloader::DownloadOrchestrator;

/// Services shared by every handler
pub struct AppContext {
    /// Shared engine and API wiring; each request runs on its own `session()`
    pub orchestrator: DownloadOrchestrator,
    /// Parent of the per-request download directories
    pub scratch_dir: PathBuf,
}

pub type AppState = Arc<AppContext>;

impl AppContext {
    pub fn new(orchestrator: DownloadOrchestrator, scratch_dir: impl Into<PathBuf>) -> AppState {
        Arc::new(Self {
            orchestrator,
            scratch_dir: scratch_dir.into(),
        })
    }
}

/// Build the orchestrator from `config` and serve until the process stops.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let orchestrator = DownloadOrchestrator::new(config.downloader.clone())?;
    if !orchestrator.has_muxer() {
        tracing::warn!("[Server] ffmpeg not found; audio is served in its native container");
    }
    if config.downloader.api_key.is_none() {
        tracing::warn!("[Server] YOUTUBE_API_KEY not set; /video-info will fail");
    }

    tokio::fs::create_dir_all(&config.scratch_dir).await?;
    let state = AppContext::new(orchestrator, config.scratch_dir.clone());
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("[Server] tubegrab listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
