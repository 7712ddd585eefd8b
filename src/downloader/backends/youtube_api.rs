// YouTube Data API v3 client

use async_trait::async_trait;
use std::time::Duration;

use crate::downloader::errors::DownloaderError;
use crate::downloader::traits::VideoApi;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const VIDEO_PARTS: &str = "snippet,contentDetails,statistics";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct YoutubeDataApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YoutubeDataApi {
    pub fn new(api_key: impl Into<String>, proxy: Option<&str>) -> Result<Self, DownloaderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DownloaderError::Api("YouTube API key is not configured".to_string()));
        }

        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| DownloaderError::InvalidInput(format!("Invalid proxy URL {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            base_url: YOUTUBE_API_BASE.to_string(),
        })
    }

    /// Point the client at another host (local fakes in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl VideoApi for YoutubeDataApi {
    async fn fetch_video(&self, video_id: &str) -> Result<serde_json::Value, DownloaderError> {
        let url = format!("{}/videos", self.base_url);
        tracing::debug!("[YoutubeApi] GET {} id={}", url, video_id);

        let response = self
            .client
            .get(&url)
            .query(&[("part", VIDEO_PARTS), ("id", video_id), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("[YoutubeApi] {} for id={}: {}", status, video_id, body.trim());
            return Err(DownloaderError::Api(format!("YouTube API returned {}", status)));
        }

        Ok(response.json().await?)
    }
}
