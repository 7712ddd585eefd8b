// Embedded callback surface
//
// Plain strings, booleans and JSON in and out, for hosts that drive the
// downloader from a native app. Async work runs on a runtime owned by the
// bridge; every call blocks until it finishes. Do not call from inside
// another tokio runtime.

use serde_json::json;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::DownloaderConfig;
use crate::downloader::errors::DownloaderError;
use crate::downloader::models::{DownloadFailure, DownloadResult, MetadataSource};
use crate::downloader::DownloadOrchestrator;

pub struct Bridge {
    runtime: Runtime,
    orchestrator: Option<DownloadOrchestrator>,
}

impl Bridge {
    pub fn new() -> Result<Self, DownloaderError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("tubegrab-bridge")
            .build()
            .map_err(|e| DownloaderError::Unexpected(format!("Failed to start runtime: {}", e)))?;

        Ok(Self {
            runtime,
            orchestrator: None,
        })
    }

    /// Install a ready-made orchestrator (custom engine wiring).
    pub fn with_orchestrator(mut self, orchestrator: DownloadOrchestrator) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    pub fn is_ready(&self) -> bool {
        self.orchestrator.is_some()
    }

    /// `config_json` is a [`DownloaderConfig`]; empty means all defaults.
    pub fn create_orchestrator(&mut self, config_json: &str) -> bool {
        let config = if config_json.trim().is_empty() {
            DownloaderConfig::default()
        } else {
            match serde_json::from_str::<DownloaderConfig>(config_json) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("[Bridge] Invalid config: {}", e);
                    return false;
                }
            }
        };

        match DownloadOrchestrator::new(config) {
            Ok(orchestrator) => {
                self.orchestrator = Some(orchestrator);
                tracing::info!("[Bridge] Orchestrator created");
                true
            }
            Err(e) => {
                tracing::error!("[Bridge] Failed to create orchestrator: {}", e);
                false
            }
        }
    }

    pub fn set_cookies(&mut self, raw: Option<&str>) -> bool {
        self.orchestrator
            .as_mut()
            .map(|o| o.set_cookies(raw))
            .unwrap_or(false)
    }

    pub fn set_progress_callback<F>(&self, callback: F) -> bool
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        match &self.orchestrator {
            Some(o) => {
                o.set_progress_callback(callback);
                true
            }
            None => false,
        }
    }

    pub fn remove_progress_callback(&self) -> bool {
        match &self.orchestrator {
            Some(o) => {
                o.clear_progress_callback();
                true
            }
            None => false,
        }
    }

    pub fn set_ffmpeg_path(&mut self, path: &str) -> bool {
        self.orchestrator
            .as_mut()
            .map(|o| o.set_ffmpeg_path(path))
            .unwrap_or(false)
    }

    /// Metadata JSON, or `{error, kind}`. `source` is `"extraction"` (default) or `"api"`.
    pub fn get_video_info(&self, url: &str, source: &str) -> String {
        let orchestrator = match self.orchestrator() {
            Ok(o) => o,
            Err(e) => return error_json(&e),
        };
        let source: MetadataSource = match source.parse() {
            Ok(s) => s,
            Err(e) => return error_json(&e),
        };

        match self.runtime.block_on(orchestrator.get_video_info(url, source)) {
            Ok(meta) => serde_json::to_string(&meta).unwrap_or_else(|e| {
                error_json(&DownloaderError::Unexpected(format!("failed to encode metadata: {}", e)))
            }),
            Err(e) => error_json(&e),
        }
    }

    /// [`DownloadResult`] as JSON.
    pub fn download(&self, url: &str, format_type: &str, quality: &str, output_dir: Option<&str>) -> String {
        let orchestrator = match self.orchestrator() {
            Ok(o) => o,
            Err(e) => return DownloadResult::Failure(DownloadFailure::new(&e, Vec::new())).to_json(),
        };

        let target_dir = output_dir.map(str::trim).filter(|d| !d.is_empty()).map(Path::new);
        self.runtime
            .block_on(orchestrator.download(url, format_type, quality, target_dir))
            .to_json()
    }

    /// `{name, path, version, is_available}` or `{error, kind}`.
    pub fn test_ffmpeg(&self) -> String {
        let orchestrator = match self.orchestrator() {
            Ok(o) => o,
            Err(e) => return error_json(&e),
        };

        match self.runtime.block_on(orchestrator.test_ffmpeg()) {
            Ok(info) => json!(info).to_string(),
            Err(e) => error_json(&e),
        }
    }

    /// Trailing lines of the orchestrator log.
    pub fn logs(&self) -> Vec<String> {
        self.orchestrator.as_ref().map(|o| o.logs()).unwrap_or_default()
    }

    fn orchestrator(&self) -> Result<&DownloadOrchestrator, DownloaderError> {
        self.orchestrator
            .as_ref()
            .ok_or_else(|| DownloaderError::InvalidInput("orchestrator not created".to_string()))
    }
}

fn error_json(err: &DownloaderError) -> String {
    let mut body = json!({
        "error": err.to_string(),
        "kind": err.kind(),
        "code": err.code(),
    });
    if let DownloaderError::AuthenticationIneffective { metadata: Some(meta) } = err {
        body["metadata"] = json!(meta);
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::engine::{EngineFormat, EngineInfo, EngineOptions};
    use crate::downloader::progress::ProgressRelay;
    use crate::downloader::traits::MediaEngine;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    struct StubEngine;

    #[async_trait]
    impl MediaEngine for StubEngine {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn extract_info(&self, _url: &str, _options: &EngineOptions) -> Result<EngineInfo, DownloaderError> {
            Ok(EngineInfo {
                title: "Clip".to_string(),
                duration: Some(90),
                formats: vec![EngineFormat {
                    format_id: "22".to_string(),
                    ext: "mp4".to_string(),
                    height: Some(720),
                    ..EngineFormat::default()
                }],
                ..EngineInfo::default()
            })
        }

        async fn download(
            &self,
            _url: &str,
            options: &EngineOptions,
            progress: Arc<ProgressRelay>,
        ) -> Result<EngineInfo, DownloaderError> {
            progress.on_progress("50.0%");
            let path = options
                .output_template
                .clone()
                .unwrap()
                .replace("%(title)s", "Clip")
                .replace("%(ext)s", "mp4");
            std::fs::write(&path, b"media")?;
            Ok(EngineInfo {
                title: "Clip".to_string(),
                filename: Some(PathBuf::from(path)),
                ..EngineInfo::default()
            })
        }
    }

    fn ready_bridge(dir: &Path) -> Bridge {
        let config = DownloaderConfig::default().with_download_dir(dir);
        let orchestrator = DownloadOrchestrator::with_engine(config, Arc::new(StubEngine));
        Bridge::new().unwrap().with_orchestrator(orchestrator)
    }

    #[test]
    fn test_calls_before_create() {
        let mut bridge = Bridge::new().unwrap();
        assert!(!bridge.is_ready());
        assert!(!bridge.set_cookies(Some("a=1")));
        assert!(!bridge.set_ffmpeg_path("/usr/bin/ffmpeg"));
        assert!(!bridge.set_progress_callback(|_| {}));
        assert!(!bridge.remove_progress_callback());

        let json: serde_json::Value = serde_json::from_str(&bridge.get_video_info("https://youtu.be/abc12345678", "")).unwrap();
        assert_eq!(json["kind"], "invalid_input");

        let json: serde_json::Value =
            serde_json::from_str(&bridge.download("https://youtu.be/abc12345678", "video", "720p", None)).unwrap();
        assert_eq!(json["kind"], "invalid_input");
        assert!(json.get("filepath").is_none());
    }

    #[test]
    fn test_create_rejects_bad_config() {
        let mut bridge = Bridge::new().unwrap();
        assert!(!bridge.create_orchestrator("{not json"));
        assert!(!bridge.is_ready());
    }

    #[test]
    fn test_video_info_json() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = ready_bridge(dir.path());

        let json: serde_json::Value =
            serde_json::from_str(&bridge.get_video_info("https://youtu.be/abc12345678", "extraction")).unwrap();
        assert_eq!(json["title"], "Clip");
        assert_eq!(json["duration"], 90);
        assert_eq!(json["formats"][0]["height"], 720);

        let json: serde_json::Value =
            serde_json::from_str(&bridge.get_video_info("https://youtu.be/abc12345678", "scrape")).unwrap();
        assert_eq!(json["kind"], "invalid_input");
    }

    #[test]
    fn test_download_json_and_progress() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = ready_bridge(dir.path());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        assert!(bridge.set_progress_callback(move |p| sink.lock().unwrap().push(p)));

        let target = dir.path().join("out");
        let json: serde_json::Value = serde_json::from_str(&bridge.download(
            "https://youtu.be/abc12345678",
            "video",
            "720p",
            target.to_str(),
        ))
        .unwrap();

        assert_eq!(json["filename"], "Clip.mp4");
        assert!(json.get("error").is_none());
        assert!(target.join("Clip.mp4").is_file());
        assert_eq!(*seen.lock().unwrap(), vec![50.0]);
        assert!(bridge.remove_progress_callback());
    }

    #[test]
    fn test_invalid_format_type_json() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = ready_bridge(dir.path());

        let json: serde_json::Value =
            serde_json::from_str(&bridge.download("https://youtu.be/abc12345678", "gif", "720p", None)).unwrap();
        assert_eq!(json["kind"], "invalid_input");
        assert_eq!(json["code"], "InvalidFormatType");
    }

    #[test]
    fn test_ffmpeg_unset_reports_tool_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = ready_bridge(dir.path());

        let json: serde_json::Value = serde_json::from_str(&bridge.test_ffmpeg()).unwrap();
        assert_eq!(json["kind"], "tool_unavailable");
    }
}
