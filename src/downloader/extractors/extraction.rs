// Metadata through the extraction engine (metadata-only mode)

use async_trait::async_trait;
use std::sync::Arc;

use crate::downloader::engine::EngineOptions;
use crate::downloader::errors::DownloaderError;
use crate::downloader::models::VideoMetadata;
use crate::downloader::traits::{MediaEngine, MetadataResolver};

pub struct ExtractionResolver {
    engine: Arc<dyn MediaEngine>,
    options: EngineOptions,
}

impl ExtractionResolver {
    /// `options` supplies proxy, timeout and cookie file; download is always skipped.
    pub fn new(engine: Arc<dyn MediaEngine>, options: EngineOptions) -> Self {
        let options = EngineOptions {
            skip_download: true,
            output_template: None,
            format: None,
            merge_output_format: None,
            postprocessors: Vec::new(),
            ..options
        };
        Self { engine, options }
    }

    async fn extract(&self, reference: &str, options: &EngineOptions) -> Result<VideoMetadata, DownloaderError> {
        options.validate()?;
        let info = self.engine.extract_info(reference, options).await?;
        Ok(info.to_metadata())
    }
}

#[async_trait]
impl MetadataResolver for ExtractionResolver {
    fn name(&self) -> &'static str {
        "extraction"
    }

    async fn resolve(&self, reference: &str) -> Result<VideoMetadata, DownloaderError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DownloaderError::InvalidInput("URL is empty".to_string()));
        }

        let metadata = self.extract(reference, &self.options).await?;
        if !metadata.formats.is_empty() || self.options.cookie_file.is_none() {
            tracing::debug!(
                "[Extraction] {} formats for {} via {}",
                metadata.formats.len(),
                reference,
                self.engine.name()
            );
            return Ok(metadata);
        }

        // Cookies gave nothing usable: see what an anonymous request yields
        tracing::warn!("[Extraction] No formats with cookies for {}, retrying without", reference);
        let anonymous = self.options.clone().with_cookie_file(None);
        let fallback = match self.extract(reference, &anonymous).await {
            Ok(meta) => Some(Box::new(meta)),
            Err(e) => {
                tracing::warn!("[Extraction] Anonymous retry failed: {}", e);
                None
            }
        };

        Err(DownloaderError::AuthenticationIneffective { metadata: fallback })
    }
}
