pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod library;
pub mod progress;
pub mod sync;
pub mod video;

// Re-export main types for convenience
pub use config::{
    ConfigOverrides, DownloaderConfig, FileConfig, SyncConfig, load_config_file,
    parse_channel_list, resolve_config,
};
pub use error::{AcquireError, ChannelError, ConfigError, FeedError, LibraryError, SyncError};
pub use feed::{ChannelFeed, Entry, FeedEndpoint, Selection, fetch_channel, parse_feed, select_entries};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use library::{MediaRecord, RetentionReport, enforce_retention, list_media_files, media_exists};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use sync::{ChannelReport, DownloadOutcome, SyncReport, Syncer};
pub use video::{AcquireStatus, Acquirer, YtDlp, normalize_title};
