// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or resolving the sync configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration available: {field} is not set")]
    Missing { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors that can occur when fetching or parsing a channel feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse feed: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("Feed document has no title element")]
    MissingTitle,

    #[error("Feed document ends with {open} unclosed elements")]
    Truncated { open: usize },

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FeedError {
    /// Whether this failure happened on the wire rather than in the document
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. })
    }
}

/// Errors that can occur while running the external download tool
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Download was cancelled")]
    Cancelled,
}

/// Errors that can occur when touching the local media library
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single channel; the run continues with the next one
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Channel sync was cancelled")]
    Cancelled,
}

/// Top-level errors that end a sync run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sync run was cancelled")]
    Cancelled,
}
