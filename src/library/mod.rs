mod index;
mod nfo;
mod retention;

pub use index::{MediaRecord, list_media_files, media_exists};
pub use nfo::{NFO_EXTENSION, parse_watched, read_watched};
pub use retention::{RetentionReport, enforce_retention};
