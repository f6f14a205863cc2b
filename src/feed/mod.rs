mod fetch;
mod filter;
mod parse;

pub use fetch::{DEFAULT_FEED_BASE, FeedEndpoint, fetch_channel, fetch_feed_bytes};
pub use filter::{Selection, select_entries};
pub use parse::{ChannelFeed, Entry, SHORTS_MARKER, is_short_url, parse_feed};
