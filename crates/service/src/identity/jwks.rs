//! Remote public-key set with a background refresher.
//!
//! Readers take a snapshot per request; the refresher publishes a whole new
//! set in one store, so a reader sees either the old set or the new one.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use jsonwebtoken::jwk::JwkSet;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::metrics::JWKS_REFRESH_FAILURES_TOTAL;

pub struct KeySet {
    current: ArcSwap<JwkSet>,
    url: String,
    client: reqwest::Client,
}

impl KeySet {
    /// A handle over a fixed set, with no remote source.
    pub fn from_set(set: JwkSet) -> Arc<Self> {
        Arc::new(Self { current: ArcSwap::from_pointee(set), url: String::new(), client: reqwest::Client::new() })
    }

    /// Fetch the set once from `url`. Startup fails if this fails.
    pub async fn fetch(url: &str) -> anyhow::Result<Arc<Self>> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        let set = fetch_set(&client, url).await?;
        info!(url, keys = set.keys.len(), "jwks_fetched");
        Ok(Arc::new(Self { current: ArcSwap::from_pointee(set), url: url.to_string(), client }))
    }

    pub fn snapshot(&self) -> Arc<JwkSet> {
        self.current.load_full()
    }

    pub fn replace(&self, set: JwkSet) {
        self.current.store(Arc::new(set));
    }

    /// Re-fetch and publish. On failure the current set stays in place.
    pub async fn refresh(&self) -> anyhow::Result<usize> {
        if self.url.is_empty() {
            anyhow::bail!("key set has no remote source");
        }
        let set = fetch_set(&self.client, &self.url).await?;
        let n = set.keys.len();
        self.replace(set);
        Ok(n)
    }

    /// Spawn the refresh loop. It exits when `cancel` fires.
    pub fn spawn_refresher(self: &Arc<Self>, every: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let keys = Arc::clone(self);
        tokio::spawn(async move {
            info!("jwks refresher started (interval={every:?})");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("jwks refresher stopped");
                        break;
                    }
                    _ = tokio::time::sleep(every) => {
                        match keys.refresh().await {
                            Ok(n) => info!(keys = n, "jwks_refreshed"),
                            Err(e) => {
                                JWKS_REFRESH_FAILURES_TOTAL.inc();
                                warn!(error = %e, "jwks refresh failed; keeping current keys");
                            }
                        }
                    }
                }
            }
        })
    }
}

async fn fetch_set(client: &reqwest::Client, url: &str) -> anyhow::Result<JwkSet> {
    let set = client.get(url).send().await?.error_for_status()?.json::<JwkSet>().await?;
    Ok(set)
}
