// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::DownloaderConfig;
use crate::error::AcquireError;

/// Exit status of one download tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireStatus {
    /// Process exit code; `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
}

impl AcquireStatus {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can fetch one entry into a directory
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Download `url` with `target_dir` as the working directory
    ///
    /// Must not return while a spawned process is still running, including on
    /// cancellation.
    async fn acquire(
        &self,
        url: &Url,
        target_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<AcquireStatus, AcquireError>;
}

/// Runs an external yt-dlp compatible executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    args: Vec<String>,
}

impl YtDlp {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &DownloaderConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn command(&self, url: &Url, target_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(url.as_str())
            .current_dir(target_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::from_config(&DownloaderConfig::default())
    }
}

#[derive(Clone, Copy)]
enum StreamKind {
    Stdout,
    Stderr,
}

/// Forward every line of a child stream to the log as it arrives
fn forward_lines<R>(stream: R, program: String, kind: StreamKind) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match kind {
                    StreamKind::Stdout => info!(target: "vidpull::downloader", "{program}: {line}"),
                    StreamKind::Stderr => warn!(target: "vidpull::downloader", "{program}: {line}"),
                },
                Ok(None) => break,
                Err(e) => {
                    debug!("Stopped reading {program} output: {e}");
                    break;
                }
            }
        }
    })
}

#[async_trait]
impl Acquirer for YtDlp {
    async fn acquire(
        &self,
        url: &Url,
        target_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<AcquireStatus, AcquireError> {
        debug!(program = %self.program, url = %url, dir = %target_dir.display(), "Starting download tool");

        let mut child = self
            .command(url, target_dir)
            .spawn()
            .map_err(|e| AcquireError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, self.program.clone(), StreamKind::Stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, self.program.clone(), StreamKind::Stderr));
        }

        let waited = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancel.cancelled() => None,
        };

        let status = match waited {
            Some(status) => status,
            None => {
                warn!(program = %self.program, url = %url, "Cancelling download");
                if let Err(e) = child.kill().await {
                    warn!("Failed to stop {}: {e}", self.program);
                }
                // Grandchildren may still hold the pipes open
                for reader in readers {
                    reader.abort();
                }
                return Err(AcquireError::Cancelled);
            }
        };

        // A background process left behind by the tool can keep the pipes open
        let drained = tokio::select! {
            _ = async {
                for reader in readers.iter_mut() {
                    let _ = reader.await;
                }
            } => true,
            _ = cancel.cancelled() => false,
        };
        if !drained {
            warn!(program = %self.program, url = %url, "Cancelled while draining output");
            for reader in &readers {
                reader.abort();
            }
            return Err(AcquireError::Cancelled);
        }

        let status = status.map_err(|e| AcquireError::Wait {
            program: self.program.clone(),
            source: e,
        })?;

        Ok(AcquireStatus {
            exit_code: status.code(),
        })
    }
}
