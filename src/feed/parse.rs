// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use url::Url;

use crate::error::FeedError;

/// Path marker the platform uses for short-form videos
pub const SHORTS_MARKER: &str = "/shorts/";

/// Represents a parsed channel feed
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    /// Display name from the feed's root title
    pub title: String,
    /// Entries in document order (newest first on the platform)
    pub entries: Vec<Entry>,
}

/// Represents a single video listed in a channel feed
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub title: String,
    pub url: Url,
    pub published: Option<DateTime<FixedOffset>>,
    pub video_id: Option<String>,
}

impl Entry {
    /// Whether the entry links to short-form content
    pub fn is_short(&self) -> bool {
        is_short_url(self.url.as_str())
    }
}

/// Case-insensitive check for the short-form path marker
pub fn is_short_url(url: &str) -> bool {
    url.to_ascii_lowercase().contains(SHORTS_MARKER)
}

#[derive(Default)]
struct EntryBuilder {
    title: Option<String>,
    alternate_link: Option<String>,
    first_link: Option<String>,
    published: Option<String>,
    video_id: Option<String>,
}

impl EntryBuilder {
    fn build(self) -> Option<Entry> {
        let href = self.alternate_link.or(self.first_link)?;
        let url = Url::parse(href.trim()).ok()?;

        Some(Entry {
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            url,
            published: self
                .published
                .and_then(|p| DateTime::parse_from_rfc3339(p.trim()).ok()),
            video_id: self.video_id.filter(|id| !id.is_empty()),
        })
    }
}

/// Text-bearing elements we care about inside the feed
#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    FeedTitle,
    EntryTitle,
    Published,
    VideoId,
}

/// Parse an Atom channel feed into its display name and entries
///
/// The root `<title>` is required; entries without a usable link are skipped.
pub fn parse_feed(xml_bytes: &[u8]) -> Result<ChannelFeed, FeedError> {
    let mut reader = Reader::from_reader(xml_bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut feed_title: Option<String> = None;
    let mut entries = Vec::new();
    let mut current: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                let name = e.local_name();
                match (name.as_ref(), depth, current.is_some()) {
                    (b"entry", 2, _) => current = Some(EntryBuilder::default()),
                    (b"title", 2, false) => {
                        feed_title.get_or_insert_with(String::new);
                        field = Some(Field::FeedTitle);
                    }
                    (b"title", 3, true) => field = Some(Field::EntryTitle),
                    (b"published", 3, true) => field = Some(Field::Published),
                    (b"videoId", 3, true) => field = Some(Field::VideoId),
                    (b"link", 3, true) => {
                        if let Some(builder) = current.as_mut() {
                            record_link(builder, &e)?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                saw_root = true;
                if depth == 1 && current.is_none() && e.local_name().as_ref() == b"title" {
                    feed_title.get_or_insert_with(String::new);
                } else if depth == 2
                    && e.local_name().as_ref() == b"link"
                    && let Some(builder) = current.as_mut()
                {
                    record_link(builder, &e)?;
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?.into_owned();
                store_text(field, text, &mut feed_title, current.as_mut());
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                store_text(field, text, &mut feed_title, current.as_mut());
            }
            Event::End(e) => {
                if depth == 2
                    && e.local_name().as_ref() == b"entry"
                    && let Some(entry) = current.take().and_then(EntryBuilder::build)
                {
                    entries.push(entry);
                }
                field = None;
                depth = depth.saturating_sub(1);
            }
            Event::Eof if depth > 0 => return Err(FeedError::Truncated { open: depth }),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(FeedError::MissingTitle);
    }

    let title = feed_title.ok_or(FeedError::MissingTitle)?;

    Ok(ChannelFeed { title, entries })
}

fn record_link(builder: &mut EntryBuilder, element: &BytesStart<'_>) -> Result<(), FeedError> {
    let attribute = |name: &str| -> Result<Option<String>, FeedError> {
        match element
            .try_get_attribute(name)
            .map_err(quick_xml::Error::from)?
        {
            Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
            None => Ok(None),
        }
    };

    let Some(href) = attribute("href")? else {
        return Ok(());
    };
    let rel = attribute("rel")?;

    match rel.as_deref() {
        None | Some("alternate") => {
            builder.alternate_link.get_or_insert(href);
        }
        _ => {
            builder.first_link.get_or_insert(href);
        }
    }
    Ok(())
}

fn store_text(
    field: Option<Field>,
    text: String,
    feed_title: &mut Option<String>,
    current: Option<&mut EntryBuilder>,
) {
    match (field, current) {
        (Some(Field::FeedTitle), None) => append(feed_title, text),
        (Some(Field::EntryTitle), Some(builder)) => append(&mut builder.title, text),
        (Some(Field::Published), Some(builder)) => append(&mut builder.published, text),
        (Some(Field::VideoId), Some(builder)) => append(&mut builder.video_id, text),
        _ => {}
    }
}

// Text and CDATA may arrive in several events for one element
fn append(slot: &mut Option<String>, text: String) {
    match slot {
        Some(existing) => existing.push_str(&text),
        None => *slot = Some(text),
    }
}
