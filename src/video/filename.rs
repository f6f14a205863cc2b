/// Extension of the media files the download tool produces
pub const MEDIA_EXTENSION: &str = "mp4";

/// Map a filesystem-unsafe character to the substitute the download tool writes
///
/// These are the look-alike replacements yt-dlp uses in its default
/// (non-restricted) filename mode; control characters become `_`.
fn substitute(c: char) -> Option<char> {
    match c {
        '|' => Some('｜'),
        ':' => Some('：'),
        '/' => Some('⧸'),
        '\\' => Some('⧹'),
        '"' => Some('＂'),
        '<' => Some('＜'),
        '>' => Some('＞'),
        '*' => Some('＊'),
        '?' => Some('？'),
        c if c.is_ascii_control() => Some('_'),
        _ => None,
    }
}

/// Normalize a feed title into the base name the download tool writes
///
/// Idempotent: no substitute is itself an unsafe character.
pub fn normalize_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| substitute(c).unwrap_or(c))
        .collect()
}

/// File name (with extension) a downloaded entry is expected to have
pub fn media_filename(title: &str) -> String {
    format!("{}.{}", normalize_title(title), MEDIA_EXTENSION)
}

/// Folder name for a channel, falling back to its id when the title is unusable
pub fn channel_dir_name(display_name: &str, channel_id: &str) -> String {
    let name = normalize_title(display_name);
    if name.is_empty() || name == "." || name == ".." {
        normalize_title(channel_id)
    } else {
        name
    }
}
