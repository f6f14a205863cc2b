// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Number of recent uploads fetched per channel when nothing else is configured
pub const DEFAULT_EPISODE_COUNT: usize = 3;

/// Download tool resolved through the search path when nothing else is configured
pub const DEFAULT_DOWNLOADER: &str = "yt-dlp";

/// How the external download tool is invoked
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Executable name or path
    pub program: String,
    /// Options placed before the entry URL
    pub args: Vec<String>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_DOWNLOADER.to_string(),
            args: Vec::new(),
        }
    }
}

/// Fully resolved, immutable settings for one sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Channel identifiers, processed in this order
    pub channels: Vec<String>,
    /// Base directory; each channel gets a sub-folder named after it
    pub output_dir: PathBuf,
    /// Per-channel cap on recent entries, also the retention floor
    pub episode_count: usize,
    /// Delete watched files beyond the retention floor
    pub delete_watched: bool,
    pub downloader: DownloaderConfig,
}

impl SyncConfig {
    /// Check the invariants a run relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::Missing { field: "channels" });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Missing {
                field: "output_dir",
            });
        }
        if self.episode_count == 0 {
            return Err(ConfigError::Invalid {
                field: "episode_count",
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.downloader.program.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "downloader.program",
            });
        }
        Ok(())
    }
}

/// Channel list as written in a config file: either an array or one comma-separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChannelList {
    List(Vec<String>),
    Joined(String),
}

impl ChannelList {
    fn into_ids(self) -> Vec<String> {
        match self {
            Self::List(items) => items
                .iter()
                .flat_map(|item| parse_channel_list(item))
                .collect(),
            Self::Joined(joined) => parse_channel_list(&joined),
        }
    }
}

/// On-disk configuration file; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub channels: Option<ChannelList>,
    pub output_dir: Option<PathBuf>,
    pub episode_count: Option<usize>,
    pub delete_watched: Option<bool>,
    pub downloader: Option<DownloaderConfig>,
}

/// Values supplied on the command line, taking precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub channels: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub episode_count: Option<usize>,
    /// `None` leaves the file's setting in place
    pub delete_watched: Option<bool>,
    pub downloader: Option<String>,
}

/// Split a comma-separated channel list, trimming entries and dropping empty ones
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// Read and parse a TOML config file
pub fn load_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Merge the optional file with command line overrides into a validated config
pub fn resolve_config(
    file: Option<FileConfig>,
    overrides: ConfigOverrides,
) -> Result<SyncConfig, ConfigError> {
    let file = file.unwrap_or_default();

    let channels = if overrides.channels.is_empty() {
        file.channels.map(ChannelList::into_ids).unwrap_or_default()
    } else {
        overrides
            .channels
            .iter()
            .flat_map(|item| parse_channel_list(item))
            .collect()
    };

    let output_dir = overrides
        .output_dir
        .or(file.output_dir)
        .ok_or(ConfigError::Missing {
            field: "output_dir",
        })?;

    let mut downloader = file.downloader.unwrap_or_default();
    if let Some(program) = overrides.downloader {
        downloader.program = program;
    }

    let config = SyncConfig {
        channels,
        output_dir,
        episode_count: overrides
            .episode_count
            .or(file.episode_count)
            .unwrap_or(DEFAULT_EPISODE_COUNT),
        delete_watched: overrides
            .delete_watched
            .or(file.delete_watched)
            .unwrap_or(false),
        downloader,
    };

    config.validate()?;
    Ok(config)
}
