// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::SyncConfig;
use crate::error::{AcquireError, ChannelError, LibraryError, SyncError};
use crate::feed::{Entry, FeedEndpoint, fetch_channel, select_entries};
use crate::http::HttpClient;
use crate::library::{RetentionReport, enforce_retention, media_exists};
use crate::progress::{ProgressEvent, SharedProgressReporter, channel_percent};
use crate::video::{Acquirer, channel_dir_name, normalize_title};

/// What happened to one selected entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The download tool exited successfully
    Downloaded,
    /// A media file with the same name was already present
    SkippedExisting,
    /// The tool could not be run or exited with an error
    Failed {
        /// Exit code, when the tool ran and exited normally
        exit_code: Option<i32>,
        reason: String,
    },
}

/// Result of syncing one channel
#[derive(Debug, Clone)]
pub struct ChannelReport {
    pub channel_id: String,
    /// Display name from the feed
    pub title: String,
    /// Folder the channel's files live in
    pub directory: PathBuf,
    /// Selected entries in feed order, with their outcome
    pub outcomes: Vec<(String, DownloadOutcome)>,
    /// Present when watched-file pruning ran
    pub retention: Option<RetentionReport>,
}

impl ChannelReport {
    fn count(&self, matches: impl Fn(&DownloadOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| matches(o)).count()
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Downloaded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::SkippedExisting))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Failed { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.retention.as_ref().map_or(0, |r| r.deleted.len())
    }
}

/// Result of a whole sync run
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Channels that were processed, in configured order
    pub channels: Vec<ChannelReport>,
    /// Channels that failed (channel id, error message)
    pub failed_channels: Vec<(String, String)>,
}

impl SyncReport {
    pub fn downloaded(&self) -> usize {
        self.channels.iter().map(ChannelReport::downloaded).sum()
    }

    pub fn skipped(&self) -> usize {
        self.channels.iter().map(ChannelReport::skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.channels.iter().map(ChannelReport::failed).sum()
    }

    pub fn deleted(&self) -> usize {
        self.channels.iter().map(ChannelReport::deleted).sum()
    }
}

/// Drives feed fetching, deduplication, downloads and retention for every channel
pub struct Syncer<C, A> {
    client: C,
    acquirer: A,
    endpoint: FeedEndpoint,
    reporter: SharedProgressReporter,
}

impl<C: HttpClient, A: Acquirer> Syncer<C, A> {
    pub fn new(client: C, acquirer: A, reporter: SharedProgressReporter) -> Self {
        Self {
            client,
            acquirer,
            endpoint: FeedEndpoint::default(),
            reporter,
        }
    }

    /// Request feeds from a different endpoint
    pub fn with_endpoint(mut self, endpoint: FeedEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Synchronize every configured channel, one after another
    ///
    /// A failing channel is logged and reported, then the next one is
    /// processed. Only an invalid configuration or cancellation ends the run
    /// early.
    pub async fn run(
        &self,
        config: &SyncConfig,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        config.validate()?;

        let total = config.channels.len();
        self.reporter.report(ProgressEvent::RunStarted {
            total_channels: total,
        });
        info!(channels = total, "Starting sync run");

        let mut report = SyncReport::default();

        for (index, channel_id) in config.channels.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }

            match self.sync_channel(config, channel_id, cancel).await {
                Ok(channel) => {
                    info!(
                        channel = %channel.title,
                        downloaded = channel.downloaded(),
                        skipped = channel.skipped(),
                        failed = channel.failed(),
                        deleted = channel.deleted(),
                        "Channel synced"
                    );
                    report.channels.push(channel);
                }
                Err(ChannelError::Cancelled) => return Err(SyncError::Cancelled),
                Err(e) => {
                    error!(channel_id = %channel_id, "Channel sync failed: {e}");
                    self.reporter.report(ProgressEvent::ChannelFailed {
                        channel_id: channel_id.clone(),
                        error: e.to_string(),
                    });
                    report
                        .failed_channels
                        .push((channel_id.clone(), e.to_string()));
                }
            }

            self.reporter.report(ProgressEvent::Progress {
                percent: channel_percent(index + 1, total),
            });
        }

        self.reporter.report(ProgressEvent::SyncCompleted {
            downloaded_count: report.downloaded(),
            skipped_count: report.skipped(),
            failed_count: report.failed(),
            deleted_count: report.deleted(),
            failed_channels: report.failed_channels.len(),
        });

        Ok(report)
    }

    async fn sync_channel(
        &self,
        config: &SyncConfig,
        channel_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ChannelReport, ChannelError> {
        self.reporter.report(ProgressEvent::FetchingFeed {
            channel_id: channel_id.to_string(),
            url: self.endpoint.channel_url(channel_id).to_string(),
        });

        let feed = tokio::select! {
            feed = fetch_channel(&self.client, &self.endpoint, channel_id) => feed?,
            _ = cancel.cancelled() => return Err(ChannelError::Cancelled),
        };

        let directory = config
            .output_dir
            .join(channel_dir_name(&feed.title, channel_id));
        ensure_directory(&directory)?;

        let total_entries = feed.entries.len();
        let selection = select_entries(feed.entries, config.episode_count);
        self.reporter.report(ProgressEvent::FeedParsed {
            channel_id: channel_id.to_string(),
            channel_title: feed.title.clone(),
            total_entries,
            selected: selection.entries.len(),
        });
        info!(
            channel = %feed.title,
            entries = total_entries,
            shorts = selection.shorts_excluded,
            selected = selection.entries.len(),
            "Feed fetched"
        );

        let total_selected = selection.entries.len();
        let mut outcomes = Vec::with_capacity(total_selected);

        for (entry_index, entry) in selection.entries.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ChannelError::Cancelled);
            }

            let outcome = self
                .sync_entry(&feed.title, &directory, entry, entry_index, total_selected, cancel)
                .await?;
            outcomes.push((entry.title.clone(), outcome));
        }

        let retention = if config.delete_watched {
            let report = enforce_retention(&directory, config.episode_count);
            self.reporter.report(ProgressEvent::RetentionApplied {
                channel_title: feed.title.clone(),
                deleted: report.deleted.len(),
            });
            Some(report)
        } else {
            None
        };

        Ok(ChannelReport {
            channel_id: channel_id.to_string(),
            title: feed.title,
            directory,
            outcomes,
            retention,
        })
    }

    async fn sync_entry(
        &self,
        channel_title: &str,
        directory: &Path,
        entry: &Entry,
        entry_index: usize,
        total_selected: usize,
        cancel: &CancellationToken,
    ) -> Result<DownloadOutcome, ChannelError> {
        let name = normalize_title(&entry.title);

        if media_exists(directory, &name) {
            info!("Already downloaded: {name}");
            self.reporter.report(ProgressEvent::EntrySkipped {
                channel_title: channel_title.to_string(),
                entry_title: entry.title.clone(),
            });
            return Ok(DownloadOutcome::SkippedExisting);
        }

        self.reporter.report(ProgressEvent::DownloadStarting {
            channel_title: channel_title.to_string(),
            entry_title: entry.title.clone(),
            entry_index,
            total_selected,
        });
        info!(url = %entry.url, "Downloading {name}");

        let outcome = match self.acquirer.acquire(&entry.url, directory, cancel).await {
            Ok(status) if status.success() => DownloadOutcome::Downloaded,
            Ok(status) => DownloadOutcome::Failed {
                exit_code: status.exit_code,
                reason: match status.exit_code {
                    Some(code) => format!("download tool exited with code {code}"),
                    None => "download tool was terminated by a signal".to_string(),
                },
            },
            Err(AcquireError::Cancelled) => return Err(ChannelError::Cancelled),
            Err(e) => DownloadOutcome::Failed {
                exit_code: None,
                reason: e.to_string(),
            },
        };

        match &outcome {
            DownloadOutcome::Failed { reason, .. } => {
                warn!("Download failed for {name}: {reason}");
                self.reporter.report(ProgressEvent::DownloadFailed {
                    channel_title: channel_title.to_string(),
                    entry_title: entry.title.clone(),
                    error: reason.clone(),
                });
            }
            _ => {
                self.reporter.report(ProgressEvent::DownloadCompleted {
                    channel_title: channel_title.to_string(),
                    entry_title: entry.title.clone(),
                });
            }
        }

        Ok(outcome)
    }
}

/// Create the channel folder if needed; an existing folder is fine
fn ensure_directory(directory: &Path) -> Result<(), LibraryError> {
    std::fs::create_dir_all(directory).map_err(|e| LibraryError::CreateDirectory {
        path: directory.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::DownloaderConfig;
    use crate::http::HttpResponse;
    use crate::progress::ProgressReporter;
    use crate::video::AcquireStatus;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::tempdir;
    use url::Url;

    /// Serves canned feeds keyed by channel id
    struct MockHttpClient {
        feeds: HashMap<String, (u16, String)>,
        requests: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        fn new(feeds: &[(&str, u16, String)]) -> Self {
            Self {
                feeds: feeds
                    .iter()
                    .map(|(id, status, body)| (id.to_string(), (*status, body.clone())))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
            self.requests.lock().unwrap().push(url.to_string());
            let channel_id = Url::parse(url)
                .unwrap()
                .query_pairs()
                .find(|(k, _)| k == "channel_id")
                .map(|(_, v)| v.into_owned())
                .unwrap();

            let (status, body) = self
                .feeds
                .get(&channel_id)
                .cloned()
                .unwrap_or((404, String::new()));
            Ok(HttpResponse {
                status,
                body: Bytes::from(body),
            })
        }
    }

    /// Records calls; writes `<file>` into the target dir for URLs in `creates`
    #[derive(Default)]
    struct MockAcquirer {
        calls: Mutex<Vec<(String, PathBuf)>>,
        exit_codes: HashMap<String, i32>,
        creates: HashMap<String, String>,
        cancel_on: Option<String>,
    }

    impl MockAcquirer {
        fn urls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(u, _)| u.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Acquirer for MockAcquirer {
        async fn acquire(
            &self,
            url: &Url,
            target_dir: &Path,
            _cancel: &CancellationToken,
        ) -> Result<AcquireStatus, AcquireError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), target_dir.to_path_buf()));

            if self.cancel_on.as_deref() == Some(url.as_str()) {
                return Err(AcquireError::Cancelled);
            }
            if let Some(file) = self.creates.get(url.as_str()) {
                std::fs::write(target_dir.join(file), b"video").unwrap();
            }
            Ok(AcquireStatus {
                exit_code: Some(self.exit_codes.get(url.as_str()).copied().unwrap_or(0)),
            })
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingReporter {
        fn percents(&self) -> Vec<f64> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    ProgressEvent::Progress { percent } => Some(*percent),
                    _ => None,
                })
                .collect()
        }
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn feed_xml(title: &str, entries: &[(&str, &str)]) -> String {
        let entries: String = entries
            .iter()
            .map(|(entry_title, url)| {
                format!("<entry><title>{entry_title}</title><link rel=\"alternate\" href=\"{url}\"/></entry>")
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><feed xmlns="http://www.w3.org/2005/Atom"><title>{title}</title>{entries}</feed>"#
        )
    }

    fn watch(id: &str) -> String {
        format!("https://www.youtube.com/watch?v={id}")
    }

    fn config(output_dir: &Path, channels: &[&str]) -> SyncConfig {
        SyncConfig {
            channels: channels.iter().map(|c| c.to_string()).collect(),
            output_dir: output_dir.to_path_buf(),
            episode_count: 3,
            delete_watched: false,
            downloader: DownloaderConfig::default(),
        }
    }

    fn five_entry_feed() -> String {
        feed_xml(
            "Test Channel",
            &[
                ("Episode 5", watch("e5").as_str()),
                ("Short clip", "https://www.youtube.com/shorts/s1"),
                ("Episode 4", watch("e4").as_str()),
                ("Episode 3", watch("e3").as_str()),
                ("Episode 2", watch("e2").as_str()),
            ],
        )
    }

    #[tokio::test]
    async fn downloads_first_non_short_entries_in_feed_order() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::new(&[("UC1", 200, five_entry_feed())]);
        let syncer = Syncer::new(client, MockAcquirer::default(), crate::NoopReporter::shared());

        let report = syncer
            .run(&config(dir.path(), &["UC1"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            syncer.acquirer.urls(),
            vec![watch("e5"), watch("e4"), watch("e3")]
        );
        assert_eq!(report.downloaded(), 3);
        assert!(report.failed_channels.is_empty());

        let channel_dir = dir.path().join("Test Channel");
        assert!(channel_dir.is_dir());
        let calls = syncer.acquirer.calls.lock().unwrap();
        assert!(calls.iter().all(|(_, d)| d == &channel_dir));
    }

    #[tokio::test]
    async fn existing_files_are_not_downloaded_again() {
        let dir = tempdir().unwrap();
        let channel_dir = dir.path().join("Test Channel");
        std::fs::create_dir_all(&channel_dir).unwrap();
        std::fs::write(channel_dir.join("Episode 4.mp4"), b"video").unwrap();

        let client = MockHttpClient::new(&[("UC1", 200, five_entry_feed())]);
        let syncer = Syncer::new(client, MockAcquirer::default(), crate::NoopReporter::shared());

        let report = syncer
            .run(&config(dir.path(), &["UC1"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(syncer.acquirer.urls(), vec![watch("e5"), watch("e3")]);
        assert_eq!(
            report.channels[0].outcomes[1],
            ("Episode 4".to_string(), DownloadOutcome::SkippedExisting)
        );
        assert_eq!(report.skipped(), 1);
    }

    #[tokio::test]
    async fn dedup_uses_normalized_titles() {
        let dir = tempdir().unwrap();
        let channel_dir = dir.path().join("Test Channel");
        std::fs::create_dir_all(&channel_dir).unwrap();
        std::fs::write(channel_dir.join("Q&A： Why？.mp4"), b"video").unwrap();

        let feed = feed_xml("Test Channel", &[("Q&amp;A: Why?", watch("q").as_str())]);
        let client = MockHttpClient::new(&[("UC1", 200, feed)]);
        let syncer = Syncer::new(client, MockAcquirer::default(), crate::NoopReporter::shared());

        syncer
            .run(&config(dir.path(), &["UC1"]), &CancellationToken::new())
            .await
            .unwrap();

        assert!(syncer.acquirer.urls().is_empty());
    }

    #[tokio::test]
    async fn second_run_skips_what_the_first_downloaded() {
        let dir = tempdir().unwrap();
        let feed = feed_xml("Chan", &[("One", watch("1").as_str()), ("Two", watch("2").as_str())]);
        let client = MockHttpClient::new(&[("UC1", 200, feed)]);
        let acquirer = MockAcquirer {
            creates: HashMap::from([
                (watch("1"), "One.mp4".to_string()),
                (watch("2"), "Two.mp4".to_string()),
            ]),
            ..Default::default()
        };
        let syncer = Syncer::new(client, acquirer, crate::NoopReporter::shared());
        let config = config(dir.path(), &["UC1"]);

        let first = syncer.run(&config, &CancellationToken::new()).await.unwrap();
        let second = syncer.run(&config, &CancellationToken::new()).await.unwrap();

        assert_eq!(first.downloaded(), 2);
        assert_eq!(second.downloaded(), 0);
        assert_eq!(second.skipped(), 2);
        assert_eq!(syncer.acquirer.urls().len(), 2);
    }

    #[tokio::test]
    async fn failing_channel_does_not_stop_the_next() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::new(&[
            ("A", 503, "Service Unavailable".to_string()),
            ("B", 200, feed_xml("Channel B", &[("B1", watch("b1").as_str())])),
        ]);
        let reporter = Arc::new(RecordingReporter::default());
        let syncer = Syncer::new(client, MockAcquirer::default(), reporter.clone());

        let report = syncer
            .run(&config(dir.path(), &["A", "B"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(syncer.acquirer.urls(), vec![watch("b1")]);
        assert_eq!(report.failed_channels.len(), 1);
        assert_eq!(report.failed_channels[0].0, "A");
        assert_eq!(report.channels.len(), 1);
        assert_eq!(reporter.percents(), vec![50.0, 100.0]);
    }

    #[tokio::test]
    async fn unparsable_feed_is_isolated_to_its_channel() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::new(&[
            ("A", 200, "<html><body>captcha</html>".to_string()),
            ("B", 200, feed_xml("Channel B", &[("B1", watch("b1").as_str())])),
        ]);
        let syncer = Syncer::new(client, MockAcquirer::default(), crate::NoopReporter::shared());

        let report = syncer
            .run(&config(dir.path(), &["A", "B"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.failed_channels[0].0, "A");
        assert_eq!(report.downloaded(), 1);
    }

    #[tokio::test]
    async fn failed_download_continues_with_next_entry() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::new(&[("UC1", 200, five_entry_feed())]);
        let acquirer = MockAcquirer {
            exit_codes: HashMap::from([(watch("e5"), 1)]),
            ..Default::default()
        };
        let syncer = Syncer::new(client, acquirer, crate::NoopReporter::shared());

        let report = syncer
            .run(&config(dir.path(), &["UC1"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(syncer.acquirer.urls().len(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.downloaded(), 2);
        assert!(matches!(
            report.channels[0].outcomes[0].1,
            DownloadOutcome::Failed {
                exit_code: Some(1),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn progress_is_reported_per_channel_and_ends_at_100() {
        let dir = tempdir().unwrap();
        let feed = feed_xml("Chan", &[]);
        let client = MockHttpClient::new(&[
            ("A", 200, feed.clone()),
            ("B", 200, feed.clone()),
            ("C", 200, feed.clone()),
            ("D", 200, feed),
        ]);
        let reporter = Arc::new(RecordingReporter::default());
        let syncer = Syncer::new(client, MockAcquirer::default(), reporter.clone());

        syncer
            .run(
                &config(dir.path(), &["A", "B", "C", "D"]),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(reporter.percents(), vec![25.0, 50.0, 75.0, 100.0]);
    }

    #[tokio::test]
    async fn retention_prunes_watched_files_when_enabled() {
        let dir = tempdir().unwrap();
        let channel_dir = dir.path().join("Chan");
        std::fs::create_dir_all(&channel_dir).unwrap();
        for name in ["Old 1", "Old 2"] {
            std::fs::write(channel_dir.join(format!("{name}.mp4")), b"video").unwrap();
            std::fs::write(
                channel_dir.join(format!("{name}.nfo")),
                "<episodedetails><watched>true</watched></episodedetails>",
            )
            .unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let feed = feed_xml("Chan", &[("New", watch("n").as_str())]);
        let client = MockHttpClient::new(&[("UC1", 200, feed)]);
        let acquirer = MockAcquirer {
            creates: HashMap::from([(watch("n"), "New.mp4".to_string())]),
            ..Default::default()
        };
        let syncer = Syncer::new(client, acquirer, crate::NoopReporter::shared());
        let mut config = config(dir.path(), &["UC1"]);
        config.episode_count = 1;
        config.delete_watched = true;

        let report = syncer.run(&config, &CancellationToken::new()).await.unwrap();

        assert_eq!(report.deleted(), 2);
        assert!(!channel_dir.join("Old 1.mp4").exists());
        assert!(!channel_dir.join("Old 2.nfo").exists());
        assert!(channel_dir.join("New.mp4").exists());
    }

    #[tokio::test]
    async fn retention_is_skipped_when_disabled() {
        let dir = tempdir().unwrap();
        let channel_dir = dir.path().join("Chan");
        std::fs::create_dir_all(&channel_dir).unwrap();
        std::fs::write(channel_dir.join("Old.mp4"), b"video").unwrap();
        std::fs::write(
            channel_dir.join("Old.nfo"),
            "<episodedetails><watched>true</watched></episodedetails>",
        )
        .unwrap();

        let client = MockHttpClient::new(&[("UC1", 200, feed_xml("Chan", &[]))]);
        let syncer = Syncer::new(client, MockAcquirer::default(), crate::NoopReporter::shared());
        let mut config = config(dir.path(), &["UC1"]);
        config.episode_count = 1;

        let report = syncer.run(&config, &CancellationToken::new()).await.unwrap();

        assert!(report.channels[0].retention.is_none());
        assert!(channel_dir.join("Old.mp4").exists());
    }

    #[tokio::test]
    async fn missing_configuration_aborts_before_any_channel() {
        let client = MockHttpClient::new(&[]);
        let syncer = Syncer::new(client, MockAcquirer::default(), crate::NoopReporter::shared());
        let config = config(Path::new(""), &["UC1"]);

        let result = syncer.run(&config, &CancellationToken::new()).await;

        assert!(matches!(result, Err(SyncError::Config(_))));
        assert!(syncer.client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_run() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::new(&[("UC1", 200, five_entry_feed())]);
        let syncer = Syncer::new(client, MockAcquirer::default(), crate::NoopReporter::shared());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = syncer.run(&config(dir.path(), &["UC1"]), &cancel).await;

        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert!(syncer.acquirer.urls().is_empty());
    }

    #[tokio::test]
    async fn cancelled_download_ends_the_run() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::new(&[
            ("A", 200, five_entry_feed()),
            ("B", 200, feed_xml("Channel B", &[("B1", watch("b1").as_str())])),
        ]);
        let acquirer = MockAcquirer {
            cancel_on: Some(watch("e4")),
            ..Default::default()
        };
        let syncer = Syncer::new(client, acquirer, crate::NoopReporter::shared());

        let result = syncer
            .run(&config(dir.path(), &["A", "B"]), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert_eq!(syncer.acquirer.urls(), vec![watch("e5"), watch("e4")]);
    }

    #[tokio::test]
    async fn custom_endpoint_is_requested() {
        let dir = tempdir().unwrap();
        let client = MockHttpClient::new(&[("UC1", 200, feed_xml("Chan", &[]))]);
        let syncer = Syncer::new(client, MockAcquirer::default(), crate::NoopReporter::shared())
            .with_endpoint(FeedEndpoint::new("http://mirror.local/feed").unwrap());

        syncer
            .run(&config(dir.path(), &["UC1"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            syncer.client.requests.lock().unwrap().as_slice(),
            ["http://mirror.local/feed?channel_id=UC1"]
        );
    }
}
