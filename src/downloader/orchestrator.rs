// Download orchestration: metadata, format resolution, engine call, result normalization

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::backends::{YoutubeDataApi, YtDlpEngine};
use super::cookies::CookieJar;
use super::engine::{EngineInfo, EngineOptions};
use super::errors::DownloaderError;
use super::extractors::{ApiResolver, ExtractionResolver};
use super::format_selector::{FormatClass, FormatSelection, FormatSelector};
use super::logbuf::LogBuffer;
use super::models::{DownloadFailure, DownloadResult, DownloadSuccess, MetadataSource, VideoMetadata};
use super::progress::ProgressRelay;
use super::reference::extract_video_id;
use super::tools::{FfmpegTool, ToolInfo};
use super::traits::{MediaEngine, MetadataResolver, VideoApi};
use crate::config::DownloaderConfig;

/// Extensions tried, in order, when the engine's prepared filename is missing.
pub const PROBE_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "webm", "m4a", "mp3", "opus", "ogg", "aac", "flac", "wav", "3gp", "flv",
];

const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

pub struct DownloadOrchestrator {
    config: DownloaderConfig,
    engine: Arc<dyn MediaEngine>,
    api: Option<Arc<dyn VideoApi>>,
    relay: Arc<ProgressRelay>,
    cookies: CookieJar,
    logs: LogBuffer,
    ffmpeg: Option<FfmpegTool>,
}

impl DownloadOrchestrator {
    /// Production wiring: yt-dlp engine, official API when a key is set,
    /// ffmpeg from config or detected on the system.
    pub fn new(config: DownloaderConfig) -> Result<Self, DownloaderError> {
        let engine = Arc::new(YtDlpEngine::new(config.ytdlp_path.clone()));

        let api: Option<Arc<dyn VideoApi>> = match config.api_key.as_deref() {
            Some(key) => Some(Arc::new(YoutubeDataApi::new(key, config.proxy.as_deref())?)),
            None => None,
        };

        let mut orchestrator = Self::with_engine(config, engine);
        orchestrator.api = api;
        if orchestrator.ffmpeg.is_none() && orchestrator.config.ffmpeg_path.is_none() {
            orchestrator.ffmpeg = FfmpegTool::detect();
            if let Some(tool) = &orchestrator.ffmpeg {
                orchestrator.logs.info(format!("Detected ffmpeg at {}", tool.path().display()));
            }
        }
        Ok(orchestrator)
    }

    /// Wire an arbitrary engine. ffmpeg comes only from `config.ffmpeg_path`.
    pub fn with_engine(config: DownloaderConfig, engine: Arc<dyn MediaEngine>) -> Self {
        let logs = LogBuffer::new(config.log_capacity);

        let ffmpeg = config.ffmpeg_path.as_ref().and_then(|path| match FfmpegTool::verify(path) {
            Ok(tool) => Some(tool),
            Err(e) => {
                logs.warn(format!("Configured ffmpeg ignored: {}", e));
                None
            }
        });

        Self {
            cookies: CookieJar::new(config.cookie_domain.clone()),
            relay: Arc::new(ProgressRelay::new()),
            api: None,
            config,
            engine,
            logs,
            ffmpeg,
        }
    }

    pub fn with_api(mut self, api: Arc<dyn VideoApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// A fresh instance over the same engine, API client and ffmpeg, with its
    /// own log, progress slot and cookie jar.
    pub fn session(&self) -> Self {
        Self {
            config: self.config.clone(),
            engine: Arc::clone(&self.engine),
            api: self.api.clone(),
            relay: Arc::new(ProgressRelay::new()),
            cookies: CookieJar::new(self.config.cookie_domain.clone()),
            logs: LogBuffer::new(self.config.log_capacity),
            ffmpeg: self.ffmpeg.clone(),
        }
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Trailing window of the instance log.
    pub fn logs(&self) -> Vec<String> {
        self.logs.snapshot()
    }

    pub fn has_muxer(&self) -> bool {
        self.ffmpeg.is_some()
    }

    pub fn cookie_file(&self) -> Option<&Path> {
        self.cookies.active_path()
    }

    /// Store cookies from a raw `name=value; ...` header. Rejected input
    /// leaves the previous cookie file untouched.
    pub fn set_cookies(&mut self, raw: Option<&str>) -> bool {
        let Some(raw) = raw else {
            self.logs.warn("Cookies rejected: none provided");
            return false;
        };

        match self.cookies.write_header(raw) {
            Ok(count) => {
                self.logs.info(format!("Stored {} cookies", count));
                true
            }
            Err(e) => {
                self.logs.warn(format!("Cookies rejected: {}", e));
                false
            }
        }
    }

    pub fn set_progress_callback<F>(&self, callback: F)
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        self.relay.set_callback(callback);
    }

    pub fn clear_progress_callback(&self) {
        self.relay.clear_callback();
    }

    /// Use the ffmpeg at `path`. An invalid path keeps the current setting.
    pub fn set_ffmpeg_path(&mut self, path: &str) -> bool {
        let path = path.trim();
        if path.is_empty() {
            self.logs.warn("ffmpeg path rejected: empty");
            return false;
        }

        match FfmpegTool::verify(path) {
            Ok(tool) => {
                self.logs.info(format!("ffmpeg set to {}", tool.path().display()));
                self.ffmpeg = Some(tool);
                true
            }
            Err(e) => {
                self.logs.warn(format!("ffmpeg path rejected: {}", e));
                false
            }
        }
    }

    /// Run `ffmpeg -version` on the configured binary.
    pub async fn test_ffmpeg(&self) -> Result<ToolInfo, DownloaderError> {
        let tool = self
            .ffmpeg
            .as_ref()
            .ok_or_else(|| DownloaderError::ToolUnavailable("ffmpeg path is not set".to_string()))?;

        match tool.probe().await {
            Ok(info) => {
                self.logs.info(format!(
                    "ffmpeg OK: {}",
                    info.version.as_deref().unwrap_or("unknown version")
                ));
                Ok(info)
            }
            Err(e) => {
                self.logs.error(format!("ffmpeg check failed: {}", e));
                Err(e)
            }
        }
    }

    /// Metadata from the source the caller picked.
    pub async fn get_video_info(
        &self,
        reference: &str,
        source: MetadataSource,
    ) -> Result<VideoMetadata, DownloaderError> {
        let result = match source {
            MetadataSource::Extraction => {
                ExtractionResolver::new(self.engine.clone(), self.base_options())
                    .resolve(reference)
                    .await
            }
            MetadataSource::OfficialApi => match self.api_resolver() {
                Ok(resolver) => resolver.resolve(reference).await,
                Err(e) => Err(e),
            },
        };

        match &result {
            Ok(meta) => self.logs.info(format!(
                "Metadata via {}: {} ({} formats)",
                source,
                meta.title,
                meta.formats.len()
            )),
            Err(e @ DownloaderError::AuthenticationIneffective { .. }) => {
                self.logs.warn(format!("Metadata via {}: {}", source, e))
            }
            Err(e) => self.logs.error(format!("Metadata via {} failed: {}", source, e)),
        }
        result
    }

    /// Raw `videos.list` response for the id in `reference`.
    pub async fn fetch_api_video(&self, reference: &str) -> Result<serde_json::Value, DownloaderError> {
        let api = self.api()?;
        let video_id = extract_video_id(reference)
            .ok_or_else(|| DownloaderError::InvalidReference(reference.trim().to_string()))?;
        api.fetch_video(&video_id).await
    }

    /// Download `reference` into `target_dir` (or the configured directory).
    /// Never panics; every failure comes back as [`DownloadResult::Failure`].
    pub async fn download(
        &self,
        reference: &str,
        format_type: &str,
        quality: &str,
        target_dir: Option<&Path>,
    ) -> DownloadResult {
        match self.try_download(reference, format_type, quality, target_dir).await {
            Ok((path, info)) => {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.logs.info(format!("Saved {}", path.display()));

                DownloadResult::Success(DownloadSuccess {
                    filepath: path,
                    filename,
                    title: info.title,
                    duration: info.duration,
                    thumbnail: info.thumbnail,
                    logs: self.logs.snapshot(),
                })
            }
            Err(e) => {
                self.logs.error(format!("Download failed: {}", e));
                DownloadResult::Failure(DownloadFailure::new(&e, self.logs.snapshot()))
            }
        }
    }

    async fn try_download(
        &self,
        reference: &str,
        format_type: &str,
        quality: &str,
        target_dir: Option<&Path>,
    ) -> Result<(PathBuf, EngineInfo), DownloaderError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DownloaderError::InvalidInput("URL is empty".to_string()));
        }
        let format_class: FormatClass = format_type.parse()?;
        let selection = FormatSelector::resolve(format_class, quality, self.has_muxer());

        let dir = target_dir.unwrap_or(&self.config.download_dir);
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            DownloaderError::FileSystem(format!("Cannot create {}: {}", dir.display(), e))
        })?;

        self.logs.info(format!(
            "Starting {} download ({}) of {}",
            format_class, quality, reference
        ));
        self.logs.info(format!("Format: {}", selection.expression));

        let options = self.download_options(dir, &selection);
        options.validate()?;

        let info = self
            .engine
            .download(reference, &options, Arc::clone(&self.relay))
            .await?;

        let prepared = info.filename.clone().ok_or_else(|| {
            DownloaderError::FileSystem("engine did not report an output file".to_string())
        })?;
        let path = locate_output(&prepared, selection.expected_ext.as_deref()).ok_or_else(|| {
            DownloaderError::FileSystem(format!("downloaded file not found: {}", prepared.display()))
        })?;

        if path != prepared {
            self.logs.info(format!(
                "Output is {} (engine reported {})",
                path.display(),
                prepared.display()
            ));
        }
        Ok((path, info))
    }

    fn base_options(&self) -> EngineOptions {
        EngineOptions::default()
            .with_cookie_file(self.cookies.active_path().map(Path::to_path_buf))
            .with_proxy(self.config.proxy.clone())
            .with_socket_timeout(Some(self.config.socket_timeout))
            .with_retries(self.config.retries, self.config.fragment_retries)
    }

    fn download_options(&self, dir: &Path, selection: &FormatSelection) -> EngineOptions {
        EngineOptions {
            output_template: Some(dir.join(OUTPUT_TEMPLATE).display().to_string()),
            format: Some(selection.expression.clone()),
            merge_output_format: selection.merge_output_format.clone(),
            postprocessors: selection.postprocessors.clone(),
            ..self.base_options()
        }
        .with_ffmpeg_location(self.ffmpeg.as_ref().map(|t| t.path().to_path_buf()))
    }

    fn api(&self) -> Result<&Arc<dyn VideoApi>, DownloaderError> {
        self.api
            .as_ref()
            .ok_or_else(|| DownloaderError::Api("YouTube API key is not configured".to_string()))
    }

    fn api_resolver(&self) -> Result<ApiResolver, DownloaderError> {
        Ok(ApiResolver::new(Arc::clone(self.api()?)))
    }
}

/// Find the file the engine actually produced.
///
/// Post-processing can change the extension after the name was reported, so
/// try the expected extension first, then the reported path, then the same
/// stem with each of [`PROBE_EXTENSIONS`].
pub fn locate_output(prepared: &Path, expected_ext: Option<&str>) -> Option<PathBuf> {
    let mut candidates = Vec::with_capacity(PROBE_EXTENSIONS.len() + 2);
    if let Some(ext) = expected_ext {
        candidates.push(prepared.with_extension(ext));
    }
    candidates.push(prepared.to_path_buf());
    candidates.extend(PROBE_EXTENSIONS.iter().map(|ext| prepared.with_extension(ext)));

    candidates.into_iter().find(|c| c.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Writes `<dir>/<title>.<written_ext>` and reports `<title>.<reported_ext>`.
    struct FakeEngine {
        title: String,
        reported_ext: &'static str,
        written_ext: Option<&'static str>,
        failure: Option<DownloaderError>,
        progress: Vec<&'static str>,
        seen: Mutex<Vec<EngineOptions>>,
    }

    impl FakeEngine {
        fn writing(reported_ext: &'static str, written_ext: &'static str) -> Self {
            Self {
                title: "Clip".to_string(),
                reported_ext,
                written_ext: Some(written_ext),
                failure: None,
                progress: Vec::new(),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: DownloaderError) -> Self {
            Self {
                failure: Some(err),
                written_ext: None,
                ..Self::writing("mp4", "mp4")
            }
        }

        fn last_options(&self) -> EngineOptions {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl MediaEngine for FakeEngine {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn extract_info(&self, _url: &str, options: &EngineOptions) -> Result<EngineInfo, DownloaderError> {
            self.seen.lock().unwrap().push(options.clone());
            Ok(EngineInfo {
                title: self.title.clone(),
                ..EngineInfo::default()
            })
        }

        async fn download(
            &self,
            _url: &str,
            options: &EngineOptions,
            progress: Arc<ProgressRelay>,
        ) -> Result<EngineInfo, DownloaderError> {
            self.seen.lock().unwrap().push(options.clone());
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            for p in &self.progress {
                progress.on_progress(p);
            }

            let template = options.output_template.clone().unwrap();
            let stem = template.replace("%(title)s", &self.title);
            if let Some(ext) = self.written_ext {
                std::fs::write(stem.replace("%(ext)s", ext), b"media").unwrap();
            }

            Ok(EngineInfo {
                title: self.title.clone(),
                duration: Some(90),
                filename: Some(PathBuf::from(stem.replace("%(ext)s", self.reported_ext))),
                ..EngineInfo::default()
            })
        }
    }

    fn orchestrator(engine: Arc<FakeEngine>, dir: &Path) -> DownloadOrchestrator {
        let config = DownloaderConfig::default().with_download_dir(dir);
        DownloadOrchestrator::with_engine(config, engine)
    }

    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("ffmpeg");
        std::fs::write(&path, "#!/bin/sh\necho 'ffmpeg version 6.0'\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_session_shares_engine_not_state() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeEngine::writing("mp4", "mp4"));
        let mut base = orchestrator(engine.clone(), dir.path());
        assert!(base.set_cookies(Some("SID=abc")));
        base.set_progress_callback(|_| {});

        let session = base.session();
        assert!(session.logs().is_empty());
        assert!(session.cookie_file().is_none());
        assert!(!session.relay.has_callback());
        assert_eq!(session.has_muxer(), base.has_muxer());

        session
            .get_video_info("https://youtu.be/abc12345678", MetadataSource::Extraction)
            .await
            .unwrap();
        assert_eq!(engine.seen.lock().unwrap().len(), 1);
        assert_eq!(session.logs().len(), 1);
        assert!(!base.logs().iter().any(|l| l.contains("Metadata via")));
    }

    #[test]
    fn test_locate_output_probes_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let prepared = dir.path().join("Clip.webm");
        assert_eq!(locate_output(&prepared, None), None);

        std::fs::write(dir.path().join("Clip.mkv"), b"x").unwrap();
        assert_eq!(locate_output(&prepared, None), Some(dir.path().join("Clip.mkv")));

        std::fs::write(dir.path().join("Clip.mp3"), b"x").unwrap();
        assert_eq!(locate_output(&prepared, Some("mp3")), Some(dir.path().join("Clip.mp3")));

        std::fs::write(&prepared, b"x").unwrap();
        assert_eq!(locate_output(&prepared, None), Some(prepared.clone()));
    }

    #[tokio::test]
    async fn test_download_success_without_muxer() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeEngine::writing("mp4", "mp4"));
        let orch = orchestrator(engine.clone(), dir.path());

        let result = orch.download("https://youtu.be/abc12345678", "video", "720p", None).await;
        let DownloadResult::Success(success) = result else {
            panic!("expected success: {:?}", result);
        };
        assert_eq!(success.filepath, dir.path().join("Clip.mp4"));
        assert_eq!(success.filename, "Clip.mp4");
        assert_eq!(success.duration, Some(90));
        assert!(!success.logs.is_empty());

        let opts = engine.last_options();
        assert_eq!(opts.format.as_deref(), Some("best[height<=720][ext=mp4]/best[height<=720]/best"));
        assert_eq!(opts.merge_output_format, None);
        assert!(opts.postprocessors.is_empty());
        assert!(opts.restrict_filenames);
        assert_eq!(opts.retries, 10);
    }

    #[tokio::test]
    async fn test_extension_mismatch_returns_real_path() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(Arc::new(FakeEngine::writing("webm", "mkv")), dir.path());

        let result = orch.download("https://youtu.be/abc12345678", "video", "best", None).await;
        let DownloadResult::Success(success) = result else {
            panic!("expected success: {:?}", result);
        };
        assert_eq!(success.filepath, dir.path().join("Clip.mkv"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_audio_with_muxer_prefers_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeEngine::writing("webm", "mp3"));
        let config = DownloaderConfig::default()
            .with_download_dir(dir.path())
            .with_ffmpeg_path(Some(fake_ffmpeg(tools.path())));
        let orch = DownloadOrchestrator::with_engine(config, engine.clone());
        assert!(orch.has_muxer());

        let result = orch.download("https://youtu.be/abc12345678", "AUDIO", "192k", None).await;
        let DownloadResult::Success(success) = result else {
            panic!("expected success: {:?}", result);
        };
        assert_eq!(success.filename, "Clip.mp3");

        let opts = engine.last_options();
        assert_eq!(opts.format.as_deref(), Some("bestaudio/best"));
        assert_eq!(opts.ffmpeg_location, Some(tools.path().join("ffmpeg")));
        assert_eq!(opts.postprocessors.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_output_is_file_system_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = FakeEngine::writing("mp4", "mp4");
        engine.written_ext = None;
        let orch = orchestrator(Arc::new(engine), dir.path());

        let result = orch.download("https://youtu.be/abc12345678", "video", "720p", None).await;
        let DownloadResult::Failure(failure) = result else {
            panic!("expected failure");
        };
        assert_eq!(failure.code, "FileSystemError");
    }

    #[tokio::test]
    async fn test_failure_never_carries_success_fields() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeEngine::failing(DownloaderError::Extraction(
            "Video unavailable".to_string(),
        )));
        let orch = orchestrator(engine, dir.path());

        let result = orch.download("https://youtu.be/abc12345678", "video", "720p", None).await;
        assert!(!result.is_success());

        let json: serde_json::Value = serde_json::from_str(&result.to_json()).unwrap();
        assert!(json["error"].as_str().unwrap().contains("Video unavailable"));
        assert_eq!(json["kind"], "backend_extraction_error");
        assert!(json.get("filepath").is_none());
        assert!(json.get("filename").is_none());
        assert!(json["logs"].as_array().unwrap().iter().any(|l| l
            .as_str()
            .unwrap()
            .contains("Download failed")));
    }

    #[tokio::test]
    async fn test_invalid_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeEngine::writing("mp4", "mp4"));
        let orch = orchestrator(engine.clone(), dir.path());

        let DownloadResult::Failure(f) = orch.download("  ", "video", "720p", None).await else {
            panic!("expected failure");
        };
        assert_eq!(f.code, "InvalidInput");

        let DownloadResult::Failure(f) = orch.download("https://youtu.be/abc12345678", "gif", "720p", None).await
        else {
            panic!("expected failure");
        };
        assert_eq!(f.code, "InvalidFormatType");

        assert!(engine.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_target_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out");
        let orch = orchestrator(Arc::new(FakeEngine::writing("mp4", "mp4")), dir.path());

        let result = orch
            .download("https://youtu.be/abc12345678", "video", "480p", Some(&target))
            .await;
        assert!(result.is_success());
        assert!(target.join("Clip.mp4").is_file());
    }

    #[tokio::test]
    async fn test_progress_reaches_callback() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = FakeEngine::writing("mp4", "mp4");
        engine.progress = vec![" 12.5%", "garbage", "100%"];
        let orch = orchestrator(Arc::new(engine), dir.path());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        orch.set_progress_callback(move |p| sink.lock().unwrap().push(p));

        assert!(orch.download("https://youtu.be/abc12345678", "video", "720p", None).await.is_success());
        assert_eq!(*seen.lock().unwrap(), vec![12.5, 100.0]);

        orch.clear_progress_callback();
        assert!(orch.download("https://youtu.be/abc12345678", "video", "720p", None).await.is_success());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cookies_flow_into_engine_options() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeEngine::writing("mp4", "mp4"));
        let mut orch = orchestrator(engine.clone(), dir.path());

        assert!(!orch.set_cookies(None));
        assert!(!orch.set_cookies(Some("novalue")));
        assert!(orch.cookie_file().is_none());

        assert!(orch.set_cookies(Some("SID=abc; __Secure-3PSID=def")));
        let cookie_path = orch.cookie_file().unwrap().to_path_buf();

        orch.get_video_info("https://youtu.be/abc12345678", MetadataSource::Extraction)
            .await
            .unwrap();
        assert_eq!(engine.last_options().cookie_file, Some(cookie_path.clone()));

        drop(orch);
        assert!(!cookie_path.exists());
    }

    #[tokio::test]
    async fn test_official_api_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(Arc::new(FakeEngine::writing("mp4", "mp4")), dir.path());

        let err = orch
            .get_video_info("https://youtu.be/abc12345678", MetadataSource::OfficialApi)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloaderError::Api(_)));
        assert!(orch.logs().iter().any(|l| l.starts_with("ERROR:")));
    }

    #[test]
    fn test_set_ffmpeg_path_rejects_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::new(FakeEngine::writing("mp4", "mp4")), dir.path());

        assert!(!orch.set_ffmpeg_path(""));
        assert!(!orch.set_ffmpeg_path("/nonexistent/ffmpeg"));
        assert!(!orch.has_muxer());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ffmpeg_probe_after_set_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(Arc::new(FakeEngine::writing("mp4", "mp4")), dir.path());

        assert!(matches!(orch.test_ffmpeg().await, Err(DownloaderError::ToolUnavailable(_))));

        let ffmpeg = fake_ffmpeg(dir.path());
        assert!(orch.set_ffmpeg_path(ffmpeg.to_str().unwrap()));
        let info = orch.test_ffmpeg().await.unwrap();
        assert_eq!(info.version.as_deref(), Some("6.0"));
    }
}
