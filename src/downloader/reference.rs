// Video reference parsing (URL -> 11-character video id)

use regex::Regex;

lazy_static::lazy_static! {
    static ref VIDEO_ID_RE: Regex = Regex::new(
        r"(?:^|//|\.)(?:youtube(?:-nocookie)?\.com/(?:.*[?&]v=|(?:v|embed|shorts|live|kids|music)/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)"
    ).expect("video id pattern is valid");
}

/// Extract the platform video id from a URL.
///
/// Recognizes `watch?v=`, `youtu.be/`, `/embed/`, `/shorts/`, `/live/` and `/v/`
/// shapes on youtube.com and its `m.`/`music.` subdomains. Anything else, or an
/// id that is not exactly 11 characters, yields `None`.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_RE
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
