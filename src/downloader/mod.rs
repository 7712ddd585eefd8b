// Downloader module - metadata resolution, download orchestration, progress and cookies

pub mod backends;
pub mod cookies;
pub mod engine;
pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod logbuf;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod reference;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::{DownloaderError, ErrorKind};
pub use format_selector::{FormatClass, FormatSelection, FormatSelector};
pub use models::{DownloadResult, FormatDescriptor, MetadataSource, VideoMetadata};
pub use orchestrator::DownloadOrchestrator;
pub use progress::ProgressRelay;
pub use traits::{MediaEngine, MetadataResolver, VideoApi};
