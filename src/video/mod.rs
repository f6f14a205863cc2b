mod acquire;
mod filename;

pub use acquire::{AcquireStatus, Acquirer, YtDlp};
pub use filename::{MEDIA_EXTENSION, channel_dir_name, media_filename, normalize_title};
