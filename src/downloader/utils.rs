// Helper functions shared by the engine and tool checks

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration as TokioDuration};

use super::errors::DownloaderError;

/// Run command with timeout (shared utility)
pub async fn run_output_with_timeout(
    program: &Path,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, DownloaderError> {
    let name = program.display().to_string();
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(&name, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloaderError::Unexpected(format!("Failed to capture stdout from {}", name)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloaderError::Unexpected(format!("Failed to capture stderr from {}", name)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let waited = timeout(TokioDuration::from_secs(timeout_secs), child.wait()).await;
    match waited {
        Ok(status_res) => {
            let status = status_res?;
            let stdout = join_reader(stdout_task).await?;
            let stderr = join_reader(stderr_task).await?;
            Ok(std::process::Output { status, stdout, stderr })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloaderError::Extraction(format!(
                "{} timed out after {}s",
                name, timeout_secs
            )))
        }
    }
}

async fn join_reader(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>, DownloaderError> {
    task.await
        .map_err(|e| DownloaderError::Unexpected(format!("reader task failed: {}", e)))?
        .map_err(DownloaderError::from)
}

/// Map a spawn failure: a missing binary is a tool problem, not an I/O one.
pub fn spawn_error(program: &str, e: std::io::Error) -> DownloaderError {
    match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            DownloaderError::ToolUnavailable(format!("{}: {}", program, e))
        }
        _ => DownloaderError::Unexpected(format!("Failed to start {}: {}", program, e)),
    }
}

/// Locate a binary: common install locations first, then `which`.
pub fn find_binary(binary_name: &str) -> Option<PathBuf> {
    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name), // Homebrew on Apple Silicon
        format!("/usr/local/bin/{}", binary_name),
        format!("/usr/bin/{}", binary_name),
    ];

    for path in common_paths {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
    }

    let output = std::process::Command::new("which")
        .arg(binary_name)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!found.is_empty()).then(|| PathBuf::from(found))
}

/// Owner/group/other execute bit check. Always true off Unix.
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_not_found_is_tool_unavailable() {
        let err = spawn_error(
            "yt-dlp",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, DownloaderError::ToolUnavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_executable(&path));

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_executable(&path));

        assert!(!is_executable(dir.path()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_output_with_timeout_captures_stdout() {
        let out = run_output_with_timeout(Path::new("/bin/sh"), vec!["-c".into(), "echo hi".into()], 5)
            .await
            .unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hi");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_output_with_timeout_kills_slow_process() {
        let err = run_output_with_timeout(Path::new("/bin/sh"), vec!["-c".into(), "sleep 5".into()], 1)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_unavailable() {
        let err = run_output_with_timeout(Path::new("/nonexistent/tubegrab-tool"), Vec::new(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloaderError::ToolUnavailable(_)));
    }
}
