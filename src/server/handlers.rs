// Request handlers

use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::Stream;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;

use super::error::HttpError;
use super::AppState;
use crate::downloader::format_selector::FormatClass;
use crate::downloader::models::{DownloadResult, MetadataSource, VideoMetadata};

const MISSING_PARAMS: &str = "Missing required parameters";

#[derive(Debug, Default, Deserialize)]
pub struct VideoInfoRequest {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetadataRequest {
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    pub url: Option<String>,
    pub format_type: Option<String>,
    pub quality: Option<String>,
}

fn required(value: Option<String>) -> Result<String, HttpError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| HttpError::BadRequest(MISSING_PARAMS.to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    payload
        .map(|Json(req)| req)
        .map_err(|e| {
            tracing::debug!("[Http] Rejected body: {}", e);
            HttpError::BadRequest(MISSING_PARAMS.to_string())
        })
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Raw official API response for the video in `url`.
pub async fn video_info(
    State(state): State<AppState>,
    payload: Result<Json<VideoInfoRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let url = required(body(payload)?.url)?;
    let raw = state.orchestrator.session().fetch_api_video(&url).await?;
    Ok(Json(raw))
}

/// Normalized metadata from the requested source (extraction by default).
pub async fn video_metadata(
    State(state): State<AppState>,
    payload: Result<Json<MetadataRequest>, JsonRejection>,
) -> Result<Json<VideoMetadata>, HttpError> {
    let req = body(payload)?;
    let url = required(req.url)?;
    let source: MetadataSource = req.source.as_deref().unwrap_or_default().parse()?;

    Ok(Json(state.orchestrator.session().get_video_info(&url, source).await?))
}

/// Download into a private directory and stream the file back. The directory
/// is removed once the body is finished or dropped, or right away on failure.
pub async fn download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let req = body(payload)?;
    let (url, format_type, quality) = (
        required(req.url)?,
        required(req.format_type)?,
        required(req.quality)?,
    );
    let format_class: FormatClass = format_type.parse()?;

    let scratch = ScratchDir(state.scratch_dir.join(uuid::Uuid::new_v4().to_string()));
    tracing::info!("[Http] Download {} ({}, {}) into {}", url, format_class, quality, scratch.0.display());

    let result = state
        .orchestrator
        .session()
        .download(&url, &format_type, &quality, Some(scratch.0.as_path()))
        .await;

    let success = match result {
        DownloadResult::Success(success) => success,
        DownloadResult::Failure(failure) => return Err(HttpError::Internal(failure.error)),
    };

    let send_error = |e: std::io::Error| HttpError::Internal(format!("Failed to send file: {}", e));
    let file = tokio::fs::File::open(&success.filepath).await.map_err(send_error)?;
    let length = file.metadata().await.map_err(send_error)?.len();

    let stream = FileStream {
        inner: ReaderStream::new(file),
        _scratch: scratch,
    };
    let headers = [
        (header::CONTENT_TYPE, content_type_for(Path::new(&success.filename), format_class).to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&success.filename)),
        (header::CONTENT_LENGTH, length.to_string()),
    ];
    Ok((headers, Body::from_stream(stream)).into_response())
}

/// Per-request download directory, removed on drop.
struct ScratchDir(PathBuf);

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("[Http] Failed to remove {}: {}", self.0.display(), e);
            }
        }
    }
}

/// File body that owns its scratch directory. Fields drop in order, so the
/// file is closed before the directory goes.
struct FileStream {
    inner: ReaderStream<tokio::fs::File>,
    _scratch: ScratchDir,
}

impl Stream for FileStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

/// MIME type from the file extension, falling back on the format class.
pub fn content_type_for(path: &Path, format_class: FormatClass) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match (ext.as_str(), format_class) {
        ("mp4", _) => "video/mp4",
        ("mkv", _) => "video/x-matroska",
        ("webm", FormatClass::Audio) => "audio/webm",
        ("webm", FormatClass::Video) => "video/webm",
        ("3gp", _) => "video/3gpp",
        ("flv", _) => "video/x-flv",
        ("mp3", _) => "audio/mpeg",
        ("m4a", _) => "audio/mp4",
        ("opus", _) => "audio/opus",
        ("ogg", _) => "audio/ogg",
        ("aac", _) => "audio/aac",
        ("flac", _) => "audio/flac",
        ("wav", _) => "audio/wav",
        (_, FormatClass::Video) => "video/mp4",
        (_, FormatClass::Audio) => "audio/mpeg",
    }
}

/// `attachment` with an ASCII fallback name and the RFC 5987 UTF-8 form.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
