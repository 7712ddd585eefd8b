// Netscape cookie file for authenticated extraction
//
// One jar per orchestrator. The file lives in the temp dir under a name that
// includes the pid and a random suffix, is readable by the owner only, and is
// removed when the jar is dropped.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::DownloaderError;

pub const DEFAULT_COOKIE_DOMAIN: &str = ".youtube.com";
const COOKIE_LIFETIME_SECS: i64 = 7 * 24 * 60 * 60;
const SECURE_PREFIXES: [&str; 2] = ["__Secure-", "__Host-"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieEntry {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    pub expires: i64,
    pub name: String,
    pub value: String,
}

impl CookieEntry {
    fn to_netscape_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.domain,
            flag(self.include_subdomains),
            self.path,
            flag(self.secure),
            self.expires,
            self.name,
            self.value
        )
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Parse a raw `Cookie:` header into entries expiring at `expires`.
///
/// Entries without a name are skipped. Fails when the header is blank, has no
/// `=` at all, or yields no usable entry.
pub fn parse_cookie_header(
    raw: &str,
    domain: &str,
    expires: i64,
) -> Result<Vec<CookieEntry>, DownloaderError> {
    if raw.trim().is_empty() {
        return Err(DownloaderError::InvalidCookies("cookie string is empty".to_string()));
    }
    if !raw.contains('=') {
        return Err(DownloaderError::InvalidCookies(
            "cookie string has no name=value pairs".to_string(),
        ));
    }

    let entries: Vec<CookieEntry> = raw
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .filter_map(|(name, value)| {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(CookieEntry {
                domain: domain.to_string(),
                include_subdomains: true,
                path: "/".to_string(),
                secure: SECURE_PREFIXES.iter().any(|p| name.starts_with(p)),
                expires,
                name: name.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect();

    if entries.is_empty() {
        return Err(DownloaderError::InvalidCookies(
            "no valid cookie entries found".to_string(),
        ));
    }

    Ok(entries)
}

pub fn render_netscape(entries: &[CookieEntry]) -> String {
    let mut out = String::from("# Netscape HTTP Cookie File\n");
    for entry in entries {
        out.push_str(&entry.to_netscape_line());
        out.push('\n');
    }
    out
}

pub struct CookieJar {
    path: PathBuf,
    domain: String,
    written: bool,
}

impl CookieJar {
    pub fn new(domain: impl Into<String>) -> Self {
        let file_name = format!(
            "tubegrab-cookies-{}-{}.txt",
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        );
        Self::with_path(std::env::temp_dir().join(file_name), domain)
    }

    pub fn with_path(path: impl Into<PathBuf>, domain: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            domain: domain.into(),
            written: false,
        }
    }

    /// Replace the jar contents with the cookies in `raw`. Returns the number
    /// of entries written. On error the previous file is left as it was.
    pub fn write_header(&mut self, raw: &str) -> Result<usize, DownloaderError> {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        let entries = parse_cookie_header(raw, &self.domain, now + COOKIE_LIFETIME_SECS)?;
        self.write_file(&render_netscape(&entries))
            .map_err(|e| DownloaderError::InvalidCookies(format!("failed to write cookie file: {}", e)))?;
        self.written = true;
        Ok(entries.len())
    }

    fn write_file(&self, contents: &str) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        restrict_permissions(&self.path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }

    /// Path handed to yt-dlp, only once something has been written.
    pub fn active_path(&self) -> Option<&Path> {
        (self.written && self.path.exists()).then_some(self.path.as_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CookieJar {
    fn drop(&mut self) {
        if self.written {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
