// yt-dlp engine - drives the native `yt-dlp` binary
//
// Metadata: `--dump-json` in simulate mode, parsed from stdout.
// Download: `--dump-json --no-simulate` plus a progress template, so stdout
// carries one JSON info line and a `[progress] NN.N%` line per update.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

use crate::downloader::engine::{EngineFormat, EngineInfo, EngineOptions, PostProcessor};
use crate::downloader::errors::DownloaderError;
use crate::downloader::progress::ProgressRelay;
use crate::downloader::traits::MediaEngine;
use crate::downloader::utils::{find_binary, run_output_with_timeout, spawn_error};

const PROGRESS_PREFIX: &str = "[progress]";
const DEFAULT_INFO_TIMEOUT_SECS: u64 = 120;

pub struct YtDlpEngine {
    ytdlp_path: PathBuf,
    info_timeout_secs: u64,
}

impl YtDlpEngine {
    /// Use `path` when given, otherwise search the usual locations.
    pub fn new(path: Option<PathBuf>) -> Self {
        let ytdlp_path = path
            .or_else(|| find_binary("yt-dlp"))
            .unwrap_or_else(|| PathBuf::from("yt-dlp"));
        tracing::debug!("[YtDlp] Using binary {}", ytdlp_path.display());

        Self {
            ytdlp_path,
            info_timeout_secs: DEFAULT_INFO_TIMEOUT_SECS,
        }
    }

    pub fn with_info_timeout(mut self, seconds: u64) -> Self {
        self.info_timeout_secs = seconds.max(1);
        self
    }

    /// Translate typed options into command-line flags.
    pub fn build_args(url: &str, options: &EngineOptions) -> Vec<String> {
        let mut args = vec!["--dump-json".to_string()];

        if options.skip_download {
            args.push("--skip-download".to_string());
        } else {
            args.extend([
                "--no-simulate".to_string(),
                "--newline".to_string(),
                "--progress".to_string(),
                "--progress-template".to_string(),
                format!("download:{} %(progress._percent_str)s", PROGRESS_PREFIX),
            ]);
        }

        if options.quiet {
            args.push("--quiet".to_string());
        } else {
            args.push("--verbose".to_string());
        }
        if options.no_warnings {
            args.push("--no-warnings".to_string());
        }
        if options.ignore_errors {
            args.push("--ignore-errors".to_string());
        }
        if options.extract_flat {
            args.push("--flat-playlist".to_string());
        }
        if options.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if options.restrict_filenames {
            args.push("--restrict-filenames".to_string());
        }

        if let Some(template) = &options.output_template {
            args.push("-o".to_string());
            args.push(template.clone());
        }
        if let Some(format) = &options.format {
            args.push("-f".to_string());
            args.push(format.clone());
        }
        if let Some(container) = &options.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }

        for pp in &options.postprocessors {
            match pp {
                PostProcessor::ExtractAudio { codec, quality } => {
                    args.push("-x".to_string());
                    args.push("--audio-format".to_string());
                    args.push(codec.clone());
                    args.push("--audio-quality".to_string());
                    args.push(audio_quality_arg(quality));
                }
            }
        }

        if let Some(path) = &options.cookie_file {
            args.push("--cookies".to_string());
            args.push(path.display().to_string());
        }

        args.push("--retries".to_string());
        args.push(options.retries.to_string());
        args.push("--fragment-retries".to_string());
        args.push(options.fragment_retries.to_string());

        if let Some(timeout) = options.socket_timeout {
            args.push("--socket-timeout".to_string());
            args.push(timeout.to_string());
        }
        if let Some(ffmpeg) = &options.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.display().to_string());
        }
        if let Some(proxy) = &options.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        // Keep a URL starting with '-' from being read as an option
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Parse the `--dump-json` record.
    pub fn parse_json(json_str: &str) -> Result<EngineInfo, DownloaderError> {
        let json: serde_json::Value = serde_json::from_str(json_str.trim())?;

        let filename = json["_filename"]
            .as_str()
            .or_else(|| json["filename"].as_str())
            .map(PathBuf::from);

        Ok(EngineInfo {
            id: json["id"].as_str().unwrap_or("unknown").to_string(),
            title: json["title"].as_str().unwrap_or("Unknown").to_string(),
            duration: json["duration"].as_f64().map(|d| d.max(0.0).round() as u64),
            thumbnail: json["thumbnail"].as_str().map(|s| s.to_string()),
            uploader: json["uploader"]
                .as_str()
                .or_else(|| json["channel"].as_str())
                .map(|s| s.to_string()),
            view_count: json["view_count"].as_u64(),
            ext: json["ext"].as_str().map(|s| s.to_string()),
            filename,
            formats: Self::parse_formats(&json),
        })
    }

    fn parse_formats(json: &serde_json::Value) -> Vec<EngineFormat> {
        let Some(formats_array) = json["formats"].as_array() else {
            return Vec::new();
        };

        formats_array
            .iter()
            .map(|f| EngineFormat {
                format_id: f["format_id"].as_str().unwrap_or("").to_string(),
                ext: f["ext"].as_str().unwrap_or("").to_string(),
                height: f["height"].as_u64().map(|h| h as u32),
                format_note: f["format_note"].as_str().map(|s| s.to_string()),
                url: f["url"].as_str().map(|s| s.to_string()),
            })
            .collect()
    }

    fn program_name(&self) -> String {
        self.ytdlp_path.display().to_string()
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

/// yt-dlp reads values above 10 as VBR levels unless they carry a `K` suffix.
fn audio_quality_arg(quality: &str) -> String {
    match quality.parse::<u32>() {
        Ok(kbps) if kbps > 10 => format!("{}K", kbps),
        _ => quality.to_string(),
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract_info(
        &self,
        url: &str,
        options: &EngineOptions,
    ) -> Result<EngineInfo, DownloaderError> {
        let mut options = options.clone();
        options.skip_download = true;
        let args = Self::build_args(url, &options);
        tracing::debug!("[YtDlp] Running: {} {}", self.program_name(), args.join(" "));

        let output = run_output_with_timeout(&self.ytdlp_path, args, self.info_timeout_secs).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloaderError::from_engine_output(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json_line = stdout
            .lines()
            .find(|l| l.trim_start().starts_with('{'))
            .ok_or_else(|| DownloaderError::Extraction("yt-dlp returned no info record".to_string()))?;
        Self::parse_json(json_line)
    }

    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        progress: Arc<ProgressRelay>,
    ) -> Result<EngineInfo, DownloaderError> {
        let args = Self::build_args(url, options);
        let name = self.program_name();
        tracing::info!("[YtDlp] Starting download: {} {}", name, args.join(" "));

        let mut child = TokioCommand::new(&self.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&name, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloaderError::Unexpected("Failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloaderError::Unexpected("Failed to capture stderr".to_string()))?;

        // Progress lines go to the relay from either stream; yt-dlp prints
        // them on stderr once --dump-json puts it in quiet mode
        let stderr_progress = Arc::clone(&progress);
        let stdout_task = tokio::spawn(async move {
            let mut info_line = None;
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let trimmed = line.trim();
                if let Some(percent) = trimmed.strip_prefix(PROGRESS_PREFIX) {
                    progress.on_progress(percent);
                } else if trimmed.starts_with('{') {
                    info_line = Some(line);
                } else if !trimmed.is_empty() {
                    tracing::debug!("[yt-dlp] {}", trimmed);
                }
            }
            info_line
        });
        let stderr_task = tokio::spawn(async move {
            let mut output = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match line.trim().strip_prefix(PROGRESS_PREFIX) {
                    Some(percent) => stderr_progress.on_progress(percent),
                    None => {
                        output.push_str(&line);
                        output.push('\n');
                    }
                }
            }
            output
        });

        let status = child.wait().await?;
        let info_line = stdout_task
            .await
            .map_err(|e| DownloaderError::Unexpected(format!("stdout reader failed: {}", e)))?;
        let stderr_output = stderr_task.await.unwrap_or_default();

        if !status.success() {
            tracing::warn!("[YtDlp] Download failed ({}): {}", status, stderr_output.trim());
            return Err(DownloaderError::from_engine_output(&stderr_output));
        }

        let info_line = info_line
            .ok_or_else(|| DownloaderError::Extraction("yt-dlp returned no info record".to_string()))?;
        Self::parse_json(&info_line)
    }
}
