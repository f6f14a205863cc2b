// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::error::FeedError;
use crate::http::HttpClient;

use super::parse::{ChannelFeed, parse_feed};

/// Public per-channel feed endpoint
pub const DEFAULT_FEED_BASE: &str = "https://www.youtube.com/feeds/videos.xml";

/// Where channel feeds are requested from
#[derive(Debug, Clone)]
pub struct FeedEndpoint {
    base: Url,
}

impl FeedEndpoint {
    /// Use a different feed base, e.g. a local mirror
    pub fn new(base: &str) -> Result<Self, FeedError> {
        Ok(Self {
            base: Url::parse(base)?,
        })
    }

    /// Feed URL for one channel identifier
    pub fn channel_url(&self, channel_id: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("channel_id", channel_id);
        url
    }
}

impl Default for FeedEndpoint {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_FEED_BASE).expect("default feed base is a valid URL"),
        }
    }
}

/// Fetch raw feed bytes from a URL (without parsing)
pub async fn fetch_feed_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Bytes, FeedError> {
    let response = client.get(url).await.map_err(|e| FeedError::Network {
        url: url.to_string(),
        source: e,
    })?;

    if !response.is_success() {
        return Err(FeedError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(response.body)
}

/// Fetch and parse the feed of one channel
pub async fn fetch_channel<C: HttpClient + ?Sized>(
    client: &C,
    endpoint: &FeedEndpoint,
    channel_id: &str,
) -> Result<ChannelFeed, FeedError> {
    let url = endpoint.channel_url(channel_id);
    debug!(channel_id, url = %url, "Fetching channel feed");

    let bytes = fetch_feed_bytes(client, url.as_str()).await?;
    parse_feed(&bytes)
}
