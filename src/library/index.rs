// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

use crate::error::LibraryError;
use crate::video::MEDIA_EXTENSION;

use super::nfo::{NFO_EXTENSION, read_watched};

/// One downloaded item: its media file plus every file sharing its base name
#[derive(Debug, Clone)]
pub struct MediaRecord {
    /// Full path of the media file
    pub path: PathBuf,
    /// File name without the media extension
    pub base_name: String,
    /// Creation time, or modification time where the platform lacks it
    pub created: SystemTime,
    /// Companion files named `<base_name>.<anything>`
    pub sidecars: Vec<PathBuf>,
    /// Watch state from the `.nfo` sidecar
    pub watched: bool,
}

impl MediaRecord {
    /// Media file followed by its sidecars
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.path.as_path()).chain(self.sidecars.iter().map(PathBuf::as_path))
    }
}

/// Split a file name into base name and extension if it is a media file
fn media_base_name(file_name: &str) -> Option<&str> {
    let (base, ext) = file_name.rsplit_once('.')?;
    (!base.is_empty() && ext.eq_ignore_ascii_case(MEDIA_EXTENSION)).then_some(base)
}

/// Names of regular files in a directory
fn file_names(directory: &Path) -> Result<Vec<String>, LibraryError> {
    let entries = std::fs::read_dir(directory).map_err(|e| LibraryError::ReadDirectory {
        path: directory.to_path_buf(),
        source: e,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LibraryError::ReadDirectory {
            path: directory.to_path_buf(),
            source: e,
        })?;

        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Whether a media file for `normalized_title` is already present
///
/// Base names compare case-insensitively. A missing directory holds nothing.
pub fn media_exists(directory: &Path, normalized_title: &str) -> bool {
    let names = match file_names(directory) {
        Ok(names) => names,
        Err(e) => {
            if directory.exists() {
                warn!("{e}");
            }
            return false;
        }
    };

    let wanted = normalized_title.to_lowercase();
    names
        .iter()
        .filter_map(|name| media_base_name(name))
        .any(|base| base.to_lowercase() == wanted)
}

/// List media files with their sidecars and watch state, oldest first
///
/// A missing or unreadable directory yields an empty list.
pub fn list_media_files(directory: &Path) -> Vec<MediaRecord> {
    match scan_media_records(directory) {
        Ok(records) => records,
        Err(e) => {
            if directory.exists() {
                warn!("{e}");
            }
            Vec::new()
        }
    }
}

fn scan_media_records(directory: &Path) -> Result<Vec<MediaRecord>, LibraryError> {
    let names = file_names(directory)?;

    let mut records: HashMap<&str, MediaRecord> = HashMap::new();
    for name in &names {
        let Some(base) = media_base_name(name) else {
            continue;
        };
        let path = directory.join(name);
        let created = std::fs::metadata(&path)
            .and_then(|m| m.created().or_else(|_| m.modified()))
            .unwrap_or(SystemTime::UNIX_EPOCH);

        records.insert(
            base,
            MediaRecord {
                path,
                base_name: base.to_string(),
                created,
                sidecars: Vec::new(),
                watched: false,
            },
        );
    }

    // Attach every non-media file that shares a base name with a record.
    // Base names can contain dots, so try the longest prefix first.
    for name in &names {
        if media_base_name(name).is_some() {
            continue;
        }
        for (idx, _) in name.rmatch_indices('.') {
            if let Some(record) = records.get_mut(&name[..idx]) {
                record.sidecars.push(directory.join(name));
                break;
            }
        }
    }

    let mut records: Vec<MediaRecord> = records.into_values().collect();
    for record in &mut records {
        record.sidecars.sort();
        let nfo = directory.join(format!("{}.{}", record.base_name, NFO_EXTENSION));
        record.watched = read_watched(&nfo);
    }

    records.sort_by(|a, b| {
        a.created
            .cmp(&b.created)
            .then_with(|| a.base_name.cmp(&b.base_name))
    });

    Ok(records)
}
