// Concrete implementations of the engine and API seams

pub mod youtube_api;
pub mod ytdlp;

pub use youtube_api::YoutubeDataApi;
pub use ytdlp::YtDlpEngine;
