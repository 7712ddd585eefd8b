// Metadata through the official YouTube Data API

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

use crate::downloader::errors::DownloaderError;
use crate::downloader::models::VideoMetadata;
use crate::downloader::reference::extract_video_id;
use crate::downloader::traits::{MetadataResolver, VideoApi};

lazy_static::lazy_static! {
    static ref ISO8601_DURATION_RE: Regex =
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").unwrap();
}

#[derive(Debug, Default, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    content_details: ContentDetails,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    fallback: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    // The API sends counts as decimal strings
    view_count: Option<String>,
}

pub struct ApiResolver {
    api: Arc<dyn VideoApi>,
}

impl ApiResolver {
    pub fn new(api: Arc<dyn VideoApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl MetadataResolver for ApiResolver {
    fn name(&self) -> &'static str {
        "official_api"
    }

    async fn resolve(&self, reference: &str) -> Result<VideoMetadata, DownloaderError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DownloaderError::InvalidInput("URL is empty".to_string()));
        }
        let video_id = extract_video_id(reference)
            .ok_or_else(|| DownloaderError::InvalidReference(reference.to_string()))?;

        let raw = self.api.fetch_video(&video_id).await?;
        parse_video_response(raw, &video_id)
    }
}

/// Normalize a `videos.list` response. Formats are never available here.
pub fn parse_video_response(raw: serde_json::Value, video_id: &str) -> Result<VideoMetadata, DownloaderError> {
    let response: VideoListResponse = serde_json::from_value(raw)
        .map_err(|e| DownloaderError::Api(format!("Malformed API response: {}", e)))?;

    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| DownloaderError::NotFound(video_id.to_string()))?;

    let thumbnails = item.snippet.thumbnails;
    let thumbnail = thumbnails
        .high
        .or(thumbnails.medium)
        .or(thumbnails.fallback)
        .map(|t| t.url)
        .unwrap_or_default();

    Ok(VideoMetadata {
        title: item.snippet.title,
        duration: item
            .content_details
            .duration
            .as_deref()
            .map(parse_iso8601_duration)
            .unwrap_or(0),
        thumbnail,
        channel: item.snippet.channel_title,
        view_count: item
            .statistics
            .view_count
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        formats: Vec::new(),
    })
}

/// `PnDTnHnMnS` to seconds; anything unparseable is 0.
pub fn parse_iso8601_duration(duration: &str) -> u64 {
    let Some(caps) = ISO8601_DURATION_RE.captures(duration.trim()) else {
        tracing::debug!("[Api] Unparseable duration {:?}", duration);
        return 0;
    };

    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    [(1, 86_400), (2, 3_600), (3, 60), (4, 1)]
        .into_iter()
        .try_fold(0u64, |total, (i, unit)| part(i).checked_mul(unit)?.checked_add(total))
        .unwrap_or_else(|| {
            tracing::debug!("[Api] Duration out of range {:?}", duration);
            0
        })
}
