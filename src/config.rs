// Runtime configuration for the downloader and the HTTP service

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::downloader::cookies::DEFAULT_COOKIE_DOMAIN;
use crate::downloader::logbuf::DEFAULT_LOG_CAPACITY;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";
pub const DEFAULT_SCRATCH_DIR: &str = "downloads";

/// Settings for one `DownloadOrchestrator`. Every field has a default, so
/// `{}` is a valid JSON config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    pub download_dir: PathBuf,
    /// yt-dlp binary; discovered when absent
    pub ytdlp_path: Option<PathBuf>,
    /// ffmpeg binary; detected when absent, post-processing disabled if not found
    pub ffmpeg_path: Option<PathBuf>,
    pub retries: u32,
    pub fragment_retries: u32,
    /// Seconds
    pub socket_timeout: u32,
    pub log_capacity: usize,
    pub proxy: Option<String>,
    pub cookie_domain: String,
    /// Key for the official metadata API
    pub api_key: Option<String>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            ytdlp_path: None,
            ffmpeg_path: None,
            retries: 10,
            fragment_retries: 10,
            socket_timeout: 30,
            log_capacity: DEFAULT_LOG_CAPACITY,
            proxy: None,
            cookie_domain: DEFAULT_COOKIE_DOMAIN.to_string(),
            api_key: None,
        }
    }
}

fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("TubeGrab"))
        .unwrap_or_else(|| PathBuf::from("TubeGrab"))
}

impl DownloaderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(dir) = var("TUBEGRAB_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        config.ytdlp_path = var("TUBEGRAB_YTDLP").map(PathBuf::from);
        config.ffmpeg_path = var("TUBEGRAB_FFMPEG").map(PathBuf::from);
        config.proxy = var("TUBEGRAB_PROXY");
        config.api_key = var("YOUTUBE_API_KEY");

        if let Some(raw) = var("TUBEGRAB_RETRIES") {
            match raw.parse() {
                Ok(retries) => config.retries = retries,
                Err(_) => tracing::warn!("[Config] Ignoring invalid TUBEGRAB_RETRIES={:?}", raw),
            }
        }

        config
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_ffmpeg_path(mut self, path: Option<PathBuf>) -> Self {
        self.ffmpeg_path = path;
        self
    }
}

/// Settings for the `tubegrab` HTTP service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Parent of the per-request download directories
    pub scratch_dir: PathBuf,
    pub downloader: DownloaderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            downloader: DownloaderConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            bind_addr: var("TUBEGRAB_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            scratch_dir: var("TUBEGRAB_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_DIR)),
            downloader: DownloaderConfig::from_lookup(&lookup),
        }
    }
}
