// FormatSelector - quality token -> yt-dlp format expression
//
// Handles:
// - Video: height cap from a literal pixel height or the tier table,
//   mp4 + m4a preferred, fallback chain ending at plain "best"
// - Audio: best audio stream, MP3 transcoding when ffmpeg is available
// - Unknown tokens: unconstrained best, never an error

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::engine::PostProcessor;
use super::errors::DownloaderError;

/// Target codec when ffmpeg is available for audio downloads.
pub const AUDIO_TARGET_CODEC: &str = "mp3";

/// yt-dlp's "best VBR" audio quality value.
pub const BEST_AUDIO_QUALITY: &str = "0";

const MAX_HEIGHT: u32 = 4320;
const MIN_BITRATE: u32 = 32;
const MAX_BITRATE: u32 = 320;

/// Descriptive labels and the height they cap at. The width-style labels
/// (1920p, 1280p, ...) are what the backend client sends.
const HEIGHT_TIERS: &[(&str, u32)] = &[
    ("2160p", 2160),
    ("4k", 2160),
    ("1440p", 1440),
    ("2k", 1440),
    ("1080p", 1080),
    ("fhd", 1080),
    ("720p", 720),
    ("hd", 720),
    ("480p", 480),
    ("sd", 480),
    ("360p", 360),
    ("240p", 240),
    ("144p", 144),
    ("1920p", 1080),
    ("1280p", 720),
    ("852p", 480),
    ("640p", 360),
    ("426p", 240),
    ("256p", 144),
];

const BITRATE_LABELS: &[(&str, u32)] = &[("high", 320), ("medium", 192), ("low", 128)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatClass {
    Video,
    Audio,
}

impl FromStr for FormatClass {
    type Err = DownloaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            _ => Err(DownloaderError::InvalidFormatType(s.to_string())),
        }
    }
}

impl fmt::Display for FormatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Everything the engine needs to know about the chosen format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelection {
    pub format_class: FormatClass,
    /// yt-dlp `-f` expression
    pub expression: String,
    /// Container for merged video+audio (`--merge-output-format`)
    pub merge_output_format: Option<String>,
    pub postprocessors: Vec<PostProcessor>,
    /// Extension the final file is expected to carry, if known up front
    pub expected_ext: Option<String>,
}

pub struct FormatSelector;

impl FormatSelector {
    /// Resolve a format class and quality token into a selection.
    pub fn resolve(format_class: FormatClass, quality: &str, has_muxer: bool) -> FormatSelection {
        match format_class {
            FormatClass::Video => Self::video(quality, has_muxer),
            FormatClass::Audio => Self::audio(quality, has_muxer),
        }
    }

    fn video(quality: &str, has_muxer: bool) -> FormatSelection {
        let expression = match Self::height_for(quality) {
            Some(h) => Self::capped_video_expression(h, has_muxer),
            None if has_muxer => "bestvideo+bestaudio/best".to_string(),
            None => "best".to_string(),
        };

        FormatSelection {
            format_class: FormatClass::Video,
            expression,
            merge_output_format: has_muxer.then(|| "mp4".to_string()),
            postprocessors: Vec::new(),
            expected_ext: has_muxer.then(|| "mp4".to_string()),
        }
    }

    fn audio(quality: &str, has_muxer: bool) -> FormatSelection {
        if !has_muxer {
            // No transcoding possible: keep the native container
            return FormatSelection {
                format_class: FormatClass::Audio,
                expression: "bestaudio[ext=m4a]/bestaudio[ext=webm]/bestaudio/best".to_string(),
                merge_output_format: None,
                postprocessors: Vec::new(),
                expected_ext: None,
            };
        }

        let audio_quality = Self::bitrate_for(quality)
            .map(|kbps| kbps.to_string())
            .unwrap_or_else(|| BEST_AUDIO_QUALITY.to_string());

        FormatSelection {
            format_class: FormatClass::Audio,
            expression: "bestaudio/best".to_string(),
            merge_output_format: None,
            postprocessors: vec![PostProcessor::ExtractAudio {
                codec: AUDIO_TARGET_CODEC.to_string(),
                quality: audio_quality,
            }],
            expected_ext: Some(AUDIO_TARGET_CODEC.to_string()),
        }
    }

    /// Height cap for a video quality token.
    ///
    /// Plain digits are a pixel height; anything else must be in the tier table.
    pub fn height_for(quality: &str) -> Option<u32> {
        let token = quality.trim().to_ascii_lowercase();
        if token.is_empty() {
            return None;
        }

        if token.bytes().all(|b| b.is_ascii_digit()) {
            return token
                .parse::<u32>()
                .ok()
                .filter(|h| (1..=MAX_HEIGHT).contains(h));
        }

        HEIGHT_TIERS
            .iter()
            .find(|(label, _)| *label == token)
            .map(|(_, h)| *h)
    }

    /// Bitrate in kbps for an audio quality token ("192", "192k", "192kbps", "high").
    pub fn bitrate_for(quality: &str) -> Option<u32> {
        let token = quality.trim().to_ascii_lowercase();

        if let Some((_, kbps)) = BITRATE_LABELS.iter().find(|(label, _)| *label == token) {
            return Some(*kbps);
        }

        let digits = token
            .strip_suffix("kbps")
            .or_else(|| token.strip_suffix("kb/s"))
            .or_else(|| token.strip_suffix('k'))
            .unwrap_or(&token)
            .trim();

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        digits
            .parse::<u32>()
            .ok()
            .filter(|kbps| (MIN_BITRATE..=MAX_BITRATE).contains(kbps))
    }

    fn capped_video_expression(height: u32, has_muxer: bool) -> String {
        if has_muxer {
            format!(
                "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/bestvideo[height<={h}]+bestaudio/best[height<={h}][ext=mp4]/best[height<={h}]/best",
                h = height
            )
        } else {
            format!("best[height<={h}][ext=mp4]/best[height<={h}]/best", h = height)
        }
    }
}
