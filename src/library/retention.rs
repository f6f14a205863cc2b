// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::LibraryError;

use super::index::{MediaRecord, list_media_files};

/// What a retention pass did to one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    /// Media files found before the pass
    pub examined: usize,
    /// Base names of the records whose media file was removed
    pub deleted: Vec<String>,
    /// Files that could not be removed
    pub failures: usize,
}

/// Remove the oldest watched media files until only `keep` remain
///
/// Unwatched files are never removed and do not stop the pass. Deleting a
/// record removes the media file and all of its sidecars. Failures are logged
/// and counted; a media file that stays still counts toward the floor.
pub fn enforce_retention(directory: &Path, keep: usize) -> RetentionReport {
    evict_watched(&list_media_files(directory), keep)
}

fn evict_watched(records: &[MediaRecord], keep: usize) -> RetentionReport {
    let mut report = RetentionReport {
        examined: records.len(),
        ..Default::default()
    };
    let mut remaining = records.len();

    for record in records {
        if remaining <= keep {
            break;
        }
        if !record.watched {
            debug!("Keeping unwatched {}", record.base_name);
            continue;
        }

        info!("Deleting watched {}", record.base_name);
        let (removed, failures) = delete_record(record);
        report.failures += failures;
        if removed {
            report.deleted.push(record.base_name.clone());
            remaining -= 1;
        }
    }

    report
}

/// Delete a record's media file, then its sidecars
///
/// Returns whether the media file is gone and how many files could not be
/// removed. Sidecars are left alone when the media file stays.
fn delete_record(record: &MediaRecord) -> (bool, usize) {
    if let Err(e) = remove_file(&record.path) {
        warn!("{e}");
        return (false, 1);
    }

    let failures = record
        .sidecars
        .iter()
        .filter_map(|path| remove_file(path).err())
        .inspect(|e| warn!("{e}"))
        .count();
    (true, failures)
}

fn remove_file(path: &Path) -> Result<(), LibraryError> {
    std::fs::remove_file(path).map_err(|e| LibraryError::Delete {
        path: path.to_path_buf(),
        source: e,
    })
}
