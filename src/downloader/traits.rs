// Seams to the external collaborators

use async_trait::async_trait;
use std::sync::Arc;

use super::engine::{EngineInfo, EngineOptions};
use super::errors::DownloaderError;
use super::models::VideoMetadata;
use super::progress::ProgressRelay;

/// Media extraction/download engine (yt-dlp or a test double)
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Name of the engine (for logging)
    fn name(&self) -> &'static str;

    /// Fetch the info record without downloading
    async fn extract_info(&self, url: &str, options: &EngineOptions)
        -> Result<EngineInfo, DownloaderError>;

    /// Download according to `options`. `progress` may be driven from another task.
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        progress: Arc<ProgressRelay>,
    ) -> Result<EngineInfo, DownloaderError>;
}

/// Official video metadata API, keyed by video id
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Raw JSON response for `videos?part=snippet,contentDetails,statistics&id=<id>`
    async fn fetch_video(&self, video_id: &str) -> Result<serde_json::Value, DownloaderError>;
}

/// Strategy producing [`VideoMetadata`] for a reference
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, reference: &str) -> Result<VideoMetadata, DownloaderError>;
}
