//! Push endpoint derivation
//!
//! The stream endpoint lives on the same host as the REST API: the scheme
//! is switched to its WebSocket counterpart and the whole path is replaced
//! by the stream resource.

use crate::traits::error::{FeedError, Result};
use reqwest::Url;

/// Derive the WebSocket URL from the REST base URL.
///
/// `https://api.example.com/api` + `/market/stream` -> `wss://api.example.com/market/stream`
pub fn push_url(base_url: &str, stream_path: &str) -> Result<String> {
    let mut url = match Url::parse(base_url.trim()) {
        Ok(url) => url,
        Err(e) => {
            let reason = format!("invalid base url {}: {}", base_url, e);
            return Err(FeedError::Endpoint(reason));
        }
    };

    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(FeedError::Endpoint(format!("no push scheme for {other}"))),
    };

    if url.set_scheme(scheme).is_err() {
        let reason = format!("cannot switch scheme to {}", scheme);
        return Err(FeedError::Endpoint(reason));
    }
    url.set_path(stream_path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url.to_string())
}
