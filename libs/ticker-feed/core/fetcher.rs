//! One-shot snapshot retrieval over HTTP
//!
//! `GET <base>/market` returns `{ "success": bool, "data": { ...snapshot... } }`.
//! [`SnapshotFetcher::try_fetch`] reports every failure as a [`FeedError`];
//! [`SnapshotFetcher::fetch`] is the only place that swaps a failure for a
//! synthetic snapshot.

use super::config::FeedConfig;
use super::synthetic::synthesize;
use crate::domain::{Snapshot, SymbolSet};
use crate::traits::error::{FeedError, Result};
use crate::traits::source::SnapshotSource;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
}

/// HTTP snapshot client with synthetic fallback
pub struct SnapshotFetcher {
    client: reqwest::Client,
    url: String,
    symbols: SymbolSet,
}

impl SnapshotFetcher {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()?;

        Ok(Self {
            client,
            url: config.fetch_url(),
            symbols: config.symbol_set(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Fetch and decode the remote snapshot, surfacing any failure
    pub async fn try_fetch(&self) -> Result<Snapshot> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let envelope: Envelope = response.json().await?;
        if !envelope.success {
            return Err(FeedError::Rejected);
        }

        let data = envelope.data.ok_or(FeedError::MissingData)?;
        Snapshot::from_value(&data, &self.symbols)
    }

    /// Fetch the current snapshot. Never fails: on any error a synthetic
    /// snapshot is returned instead.
    pub async fn fetch(&self) -> Snapshot {
        match self.try_fetch().await {
            Ok(snapshot) => {
                debug!("[Ticker Fetch] Snapshot received from {}", self.url);
                snapshot
            }
            Err(e) => {
                warn!("[Ticker Fetch] {} - using synthetic snapshot", e);
                self.synthetic()
            }
        }
    }

    fn synthetic(&self) -> Snapshot {
        synthesize(&self.symbols, &mut rand::thread_rng())
    }
}

#[async_trait]
impl SnapshotSource for SnapshotFetcher {
    async fn snapshot(&self) -> Snapshot {
        self.fetch().await
    }
}
