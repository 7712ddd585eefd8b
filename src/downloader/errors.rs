// Error types for the download façade

use serde::Serialize;
use thiserror::Error;

use super::models::VideoMetadata;

#[derive(Debug, Clone, Error)]
pub enum DownloaderError {
    /// Missing or malformed input (empty reference, missing field)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL does not match any known YouTube shape
    #[error("Invalid YouTube URL: {0}")]
    InvalidReference(String),

    /// Format class other than video/audio
    #[error("Invalid format type: {0}")]
    InvalidFormatType(String),

    /// Malformed cookie header or cookie file write failure
    #[error("Invalid cookies: {0}")]
    InvalidCookies(String),

    /// yt-dlp reported a failure
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Official API call failed
    #[error("API error: {0}")]
    Api(String),

    /// Official API returned no items for the id
    #[error("Video not found: {0}")]
    NotFound(String),

    /// Directory or file creation failure, or produced file missing
    #[error("File system error: {0}")]
    FileSystem(String),

    /// Binary missing or not executable
    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    /// Cookies were supplied but extraction only produced formats without them
    #[error("Authentication not effective: no formats with cookies")]
    AuthenticationIneffective {
        metadata: Option<Box<VideoMetadata>>,
    },

    /// Catch-all
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse classification reported to callers next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    InvalidCookies,
    BackendExtractionError,
    ApiError,
    FileSystemError,
    ToolUnavailable,
    UnexpectedError,
}

impl DownloaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::InvalidReference(_) | Self::InvalidFormatType(_) => {
                ErrorKind::InvalidInput
            }
            Self::InvalidCookies(_) => ErrorKind::InvalidCookies,
            Self::Extraction(_) | Self::AuthenticationIneffective { .. } => {
                ErrorKind::BackendExtractionError
            }
            Self::Api(_) | Self::NotFound(_) => ErrorKind::ApiError,
            Self::FileSystem(_) => ErrorKind::FileSystemError,
            Self::ToolUnavailable(_) => ErrorKind::ToolUnavailable,
            Self::Unexpected(_) => ErrorKind::UnexpectedError,
        }
    }

    /// Stable machine-readable code, finer than [`ErrorKind`].
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::InvalidReference(_) => "InvalidReference",
            Self::InvalidFormatType(_) => "InvalidFormatType",
            Self::InvalidCookies(_) => "InvalidCookies",
            Self::Extraction(_) => "BackendError",
            Self::Api(_) => "ApiError",
            Self::NotFound(_) => "NotFound",
            Self::FileSystem(_) => "FileSystemError",
            Self::ToolUnavailable(_) => "ToolUnavailable",
            Self::AuthenticationIneffective { .. } => "AuthenticationIneffective",
            Self::Unexpected(_) => "UnexpectedError",
        }
    }

    /// Classify raw yt-dlp stderr output.
    pub fn from_engine_output(stderr: &str) -> Self {
        let s = stderr.trim();

        if s.contains("command not found")
            || s.contains("ffmpeg not found")
            || s.contains("ffprobe and ffmpeg not found")
        {
            return Self::ToolUnavailable(s.to_string());
        }

        // yt-dlp prefixes fatal lines with "ERROR:"; keep those, drop warnings
        let errors: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("ERROR:"))
            .collect();

        let message = if errors.is_empty() {
            s.lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("yt-dlp exited with an error")
                .to_string()
        } else {
            errors.join(" | ")
        };

        if message.contains("Unsupported URL") || message.contains("is not a valid URL") {
            return Self::InvalidReference(message);
        }

        // OS errors on the output path, e.g. "[Errno 2] No such file or directory"
        if message.contains("unable to open for writing") || message.contains("[Errno ") {
            return Self::FileSystem(message);
        }

        Self::Extraction(message)
    }
}

impl From<std::io::Error> for DownloaderError {
    fn from(e: std::io::Error) -> Self {
        Self::FileSystem(e.to_string())
    }
}

// The request URL carries the API key as a query parameter
impl From<reqwest::Error> for DownloaderError {
    fn from(e: reqwest::Error) -> Self {
        Self::Api(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for DownloaderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Extraction(format!("Invalid JSON: {}", e))
    }
}
