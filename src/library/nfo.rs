use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

/// Extension of the sidecar carrying watch state
pub const NFO_EXTENSION: &str = "nfo";

/// Read the watched flag from an `.nfo` sidecar
///
/// A missing, unreadable or unparsable file counts as not watched.
pub fn read_watched(path: &Path) -> bool {
    match std::fs::read(path) {
        Ok(content) => parse_watched(&content),
        Err(e) => {
            debug!("No watch state in {}: {e}", path.display());
            false
        }
    }
}

/// Look for `<watched>true</watched>` directly below the document root
pub fn parse_watched(xml_bytes: &[u8]) -> bool {
    let mut reader = Reader::from_reader(xml_bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut in_watched = false;
    let mut value = String::new();
    let mut watched = None;

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(_) => return false,
        };

        match event {
            Event::Start(e) => {
                depth += 1;
                in_watched = depth == 2 && e.local_name().as_ref() == b"watched";
                if in_watched {
                    value.clear();
                }
            }
            Event::Text(e) if in_watched => match e.unescape() {
                Ok(text) => value.push_str(&text),
                Err(_) => return false,
            },
            Event::CData(e) if in_watched => {
                value.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(_) => {
                if in_watched && watched.is_none() {
                    watched = Some(value.trim().eq_ignore_ascii_case("true"));
                }
                in_watched = false;
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    watched.unwrap_or(false)
}
