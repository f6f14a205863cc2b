use std::sync::Arc;

/// Events emitted during a sync run for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A run is starting
    RunStarted { total_channels: usize },

    /// A channel feed is being fetched
    FetchingFeed { channel_id: String, url: String },

    /// A channel feed has been parsed and its entries selected
    FeedParsed {
        channel_id: String,
        channel_title: String,
        total_entries: usize,
        selected: usize,
    },

    /// An entry is already present locally
    EntrySkipped {
        channel_title: String,
        entry_title: String,
    },

    /// The download tool is starting for an entry
    DownloadStarting {
        channel_title: String,
        entry_title: String,
        /// Index of this entry among the selected ones
        entry_index: usize,
        total_selected: usize,
    },

    /// The download tool finished successfully
    DownloadCompleted {
        channel_title: String,
        entry_title: String,
    },

    /// The download tool failed for an entry
    DownloadFailed {
        channel_title: String,
        entry_title: String,
        error: String,
    },

    /// Watched files were pruned from a channel folder
    RetentionApplied {
        channel_title: String,
        deleted: usize,
    },

    /// A channel could not be processed; the run continues
    ChannelFailed { channel_id: String, error: String },

    /// Overall completion, in percent of channels processed
    Progress { percent: f64 },

    /// The run finished
    SyncCompleted {
        downloaded_count: usize,
        skipped_count: usize,
        failed_count: usize,
        deleted_count: usize,
        failed_channels: usize,
    },
}

/// Trait for reporting progress events during synchronization.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

/// Percentage of channels processed, clamped to [0, 100]
pub fn channel_percent(completed: usize, total: usize) -> f64 {
    if total == 0 || completed >= total {
        return 100.0;
    }
    100.0 * completed as f64 / total as f64
}
