// HTTP error mapping for the backend service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::downloader::errors::DownloaderError;

#[derive(Debug, Error)]
pub enum HttpError {
    /// 400 with the message as-is
    #[error("{0}")]
    BadRequest(String),

    /// 500 with the message as-is
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("[Http] {}", self);
        } else {
            tracing::debug!("[Http] {}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<DownloaderError> for HttpError {
    fn from(err: DownloaderError) -> Self {
        match err {
            DownloaderError::InvalidReference(_) => Self::BadRequest("Invalid YouTube URL".to_string()),
            DownloaderError::InvalidFormatType(_) => Self::BadRequest("Invalid format type".to_string()),
            DownloaderError::InvalidInput(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Service startup failures
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to initialize downloader: {0}")]
    Downloader(#[from] DownloaderError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
