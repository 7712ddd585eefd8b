pub mod bridge;
pub mod config;
pub mod downloader;
pub mod server;

pub use bridge::Bridge;
pub use config::{DownloaderConfig, ServerConfig};
pub use downloader::{DownloadOrchestrator, DownloadResult, DownloaderError, MetadataSource, VideoMetadata};

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "tubegrab=info,tower_http=info";

/// Install the global tracing subscriber (`RUST_LOG` overrides the default filter).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Entry point of the `tubegrab` HTTP service.
pub async fn run() -> Result<(), server::ServerError> {
    init_tracing();
    server::serve(ServerConfig::from_env()).await
}
