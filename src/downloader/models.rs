// Common data models for the downloader

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::errors::{DownloaderError, ErrorKind};

/// Descriptive metadata for one video. Produced fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    /// Duration in whole seconds
    pub duration: u64,
    pub thumbnail: String,
    pub channel: String,
    pub view_count: u64,
    pub formats: Vec<FormatDescriptor>,
}

/// Downloadable variant as reported by yt-dlp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub height: u32,
    pub ext: String,
    pub format_note: String,
    pub url: String,
}

/// Where metadata comes from. Chosen by the caller, never implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// yt-dlp in metadata-only mode (formats included)
    #[default]
    Extraction,
    /// YouTube Data API v3 (no formats)
    #[serde(alias = "api")]
    OfficialApi,
}

impl FromStr for MetadataSource {
    type Err = DownloaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "extraction" | "ytdlp" | "yt-dlp" => Ok(Self::Extraction),
            "api" | "official_api" | "official-api" => Ok(Self::OfficialApi),
            other => Err(DownloaderError::InvalidInput(format!(
                "Unknown metadata source: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extraction => write!(f, "extraction"),
            Self::OfficialApi => write!(f, "official_api"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadSuccess {
    pub filepath: PathBuf,
    pub filename: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadFailure {
    pub error: String,
    pub kind: ErrorKind,
    pub code: &'static str,
    pub logs: Vec<String>,
}

impl DownloadFailure {
    pub fn new(err: &DownloaderError, logs: Vec<String>) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
            code: err.code(),
            logs,
        }
    }
}

/// Outcome of a download. Success and failure fields never coexist.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DownloadResult {
    Success(DownloadSuccess),
    Failure(DownloadFailure),
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn logs(&self) -> &[String] {
        match self {
            Self::Success(s) => &s.logs,
            Self::Failure(f) => &f.logs,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"error":"failed to encode result: {}"}}"#, e)
        })
    }
}
