// External muxing/transcoding binary (ffmpeg)

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::errors::DownloaderError;
use super::utils::{find_binary, is_executable, run_output_with_timeout};

const VERSION_TIMEOUT_SECS: u64 = 15;

lazy_static::lazy_static! {
    static ref FFMPEG_VERSION_RE: Regex = Regex::new(r"ffmpeg version (\S+)").unwrap();
}

/// Verified path to an ffmpeg executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegTool {
    path: PathBuf,
}

/// Result of the `-version` liveness check
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub path: String,
    pub version: Option<String>,
    pub is_available: bool,
}

impl FfmpegTool {
    /// Accept `path` only if it exists, is a regular file and is executable.
    pub fn verify(path: impl Into<PathBuf>) -> Result<Self, DownloaderError> {
        let path = path.into();
        if !path.exists() {
            return Err(DownloaderError::ToolUnavailable(format!(
                "ffmpeg not found at {}",
                path.display()
            )));
        }
        if !is_executable(&path) {
            return Err(DownloaderError::ToolUnavailable(format!(
                "ffmpeg at {} is not executable",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// Look in the usual install locations and PATH.
    pub fn detect() -> Option<Self> {
        find_binary("ffmpeg").and_then(|p| Self::verify(p).ok())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `ffmpeg -version` and report what it says.
    pub async fn probe(&self) -> Result<ToolInfo, DownloaderError> {
        let output =
            run_output_with_timeout(&self.path, vec!["-version".to_string()], VERSION_TIMEOUT_SECS)
                .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloaderError::ToolUnavailable(format!(
                "ffmpeg -version failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(ToolInfo {
            name: "ffmpeg".to_string(),
            path: self.path.display().to_string(),
            version: parse_version(&stdout),
            is_available: true,
        })
    }
}

pub fn parse_version(output: &str) -> Option<String> {
    FFMPEG_VERSION_RE
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        let out = "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 the FFmpeg developers\nbuilt with gcc";
        assert_eq!(parse_version(out).as_deref(), Some("6.1.1-3ubuntu5"));
        assert_eq!(parse_version("garbage"), None);
    }

    #[test]
    fn test_verify_rejects_missing_path() {
        let err = FfmpegTool::verify("/nonexistent/ffmpeg").unwrap_err();
        assert!(matches!(err, DownloaderError::ToolUnavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_rejects_non_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffmpeg");
        std::fs::write(&path, "not a binary").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();

        assert!(FfmpegTool::verify(&path).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_reads_version_from_stub() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffmpeg");
        std::fs::write(&path, "#!/bin/sh\necho 'ffmpeg version 7.0 Copyright'\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let tool = FfmpegTool::verify(&path).unwrap();
        let info = tool.probe().await.unwrap();
        assert!(info.is_available);
        assert_eq!(info.version.as_deref(), Some("7.0"));
    }
}
