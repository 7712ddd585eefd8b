// Metadata resolvers
//
// Two strategies behind `MetadataResolver`, picked by the caller through
// `MetadataSource`:
// - Extraction: yt-dlp in metadata-only mode, formats included
// - OfficialApi: YouTube Data API v3, no formats

mod api;
mod extraction;

pub use api::{parse_iso8601_duration, parse_video_response, ApiResolver};
pub use extraction::ExtractionResolver;
