// Typed configuration and results for the extraction/download engine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::errors::DownloaderError;
use super::models::{FormatDescriptor, VideoMetadata};

/// Post-processing directive executed by the engine through ffmpeg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostProcessor {
    /// Extract the audio track and transcode it (`-x --audio-format --audio-quality`)
    ExtractAudio { codec: String, quality: String },
}

/// Options passed to the engine for one call.
///
/// Defaults: quiet, no warnings, no playlist, restricted filenames, 10 retries,
/// 10 fragment retries, 30 s socket timeout, nothing else set.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub quiet: bool,
    pub no_warnings: bool,
    /// Keep going after per-format errors
    pub ignore_errors: bool,
    /// Do not resolve nested entries (playlists)
    pub extract_flat: bool,
    /// Metadata-only mode
    pub skip_download: bool,
    pub no_playlist: bool,
    /// ASCII-only filenames without spaces or shell-unsafe characters
    pub restrict_filenames: bool,
    /// Output path template, e.g. `/dl/%(title)s.%(ext)s`
    pub output_template: Option<String>,
    /// Format selection expression
    pub format: Option<String>,
    pub merge_output_format: Option<String>,
    pub postprocessors: Vec<PostProcessor>,
    pub cookie_file: Option<PathBuf>,
    /// Engine-internal retries for transient network failures
    pub retries: u32,
    pub fragment_retries: u32,
    pub socket_timeout: Option<u32>,
    pub ffmpeg_location: Option<PathBuf>,
    pub proxy: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            quiet: true,
            no_warnings: true,
            ignore_errors: false,
            extract_flat: false,
            skip_download: false,
            no_playlist: true,
            restrict_filenames: true,
            output_template: None,
            format: None,
            merge_output_format: None,
            postprocessors: Vec::new(),
            cookie_file: None,
            retries: 10,
            fragment_retries: 10,
            socket_timeout: Some(30),
            ffmpeg_location: None,
            proxy: None,
        }
    }
}

impl EngineOptions {
    /// Options for a metadata-only extraction.
    pub fn metadata_only() -> Self {
        Self {
            skip_download: true,
            ..Self::default()
        }
    }

    pub fn with_cookie_file(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_file = path;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_socket_timeout(mut self, seconds: Option<u32>) -> Self {
        self.socket_timeout = seconds;
        self
    }

    pub fn with_retries(mut self, retries: u32, fragment_retries: u32) -> Self {
        self.retries = retries;
        self.fragment_retries = fragment_retries;
        self
    }

    pub fn with_ffmpeg_location(mut self, path: Option<PathBuf>) -> Self {
        self.ffmpeg_location = path;
        self
    }

    /// Reject combinations the engine cannot honour.
    pub fn validate(&self) -> Result<(), DownloaderError> {
        if let Some(format) = &self.format {
            if format.trim().is_empty() {
                return Err(DownloaderError::InvalidInput("empty format expression".to_string()));
            }
        }

        if let Some(template) = &self.output_template {
            if !template.contains("%(ext)s") {
                return Err(DownloaderError::InvalidInput(format!(
                    "output template must contain %(ext)s: {}",
                    template
                )));
            }
        }

        if !self.skip_download && self.output_template.is_none() {
            return Err(DownloaderError::InvalidInput(
                "download requested without an output template".to_string(),
            ));
        }

        let needs_muxer = !self.postprocessors.is_empty() || self.merge_output_format.is_some();
        if needs_muxer && self.ffmpeg_location.is_none() {
            return Err(DownloaderError::ToolUnavailable(
                "post-processing requested but no ffmpeg path is configured".to_string(),
            ));
        }

        if let Some(cookies) = &self.cookie_file {
            if !cookies.is_file() {
                return Err(DownloaderError::InvalidCookies(format!(
                    "cookie file missing: {}",
                    cookies.display()
                )));
            }
        }

        Ok(())
    }
}

/// One format entry as reported by the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineFormat {
    pub format_id: String,
    pub ext: String,
    pub height: Option<u32>,
    pub format_note: Option<String>,
    pub url: Option<String>,
}

/// Info record returned by the engine for metadata and download calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineInfo {
    pub id: String,
    pub title: String,
    pub duration: Option<u64>,
    pub thumbnail: Option<String>,
    pub uploader: Option<String>,
    pub view_count: Option<u64>,
    pub ext: Option<String>,
    /// Path the engine prepared from the output template
    pub filename: Option<PathBuf>,
    pub formats: Vec<EngineFormat>,
}

impl EngineInfo {
    /// Map to [`VideoMetadata`], keeping only formats that report a height.
    pub fn to_metadata(&self) -> VideoMetadata {
        let formats = self
            .formats
            .iter()
            .filter_map(|f| {
                f.height.map(|height| FormatDescriptor {
                    height,
                    ext: f.ext.clone(),
                    format_note: f.format_note.clone().unwrap_or_default(),
                    url: f.url.clone().unwrap_or_default(),
                })
            })
            .collect();

        VideoMetadata {
            title: self.title.clone(),
            duration: self.duration.unwrap_or(0),
            thumbnail: self.thumbnail.clone().unwrap_or_default(),
            channel: self.uploader.clone().unwrap_or_default(),
            view_count: self.view_count.unwrap_or(0),
            formats,
        }
    }
}
