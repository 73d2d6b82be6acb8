//! Swappable connection pool with a background liveness probe.
//!
//! Readers call [`DbPool::conn`] per operation and get whichever pool is
//! current at that instant. The probe pings on a fixed interval; after
//! `reconnect_fail_threshold` consecutive failures it opens a fresh pool,
//! pings it, publishes it, then closes the old one. Connections already
//! checked out of the old pool finish their work before it closes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::db::{connect_with_config, DatabaseConfig};

pub struct DbPool {
    current: ArcSwap<DatabaseConnection>,
    cfg: DatabaseConfig,
    swaps: AtomicU64,
}

impl DbPool {
    pub fn new(conn: DatabaseConnection, cfg: DatabaseConfig) -> Arc<Self> {
        Arc::new(Self { current: ArcSwap::from_pointee(conn), cfg, swaps: AtomicU64::new(0) })
    }

    pub async fn connect(cfg: DatabaseConfig) -> anyhow::Result<Arc<Self>> {
        let conn = connect_with_config(&cfg).await?;
        Ok(Self::new(conn, cfg))
    }

    /// Snapshot of the pool that is current right now.
    pub fn conn(&self) -> Arc<DatabaseConnection> {
        self.current.load_full()
    }

    /// Number of times a fresh pool has been swapped in.
    pub fn swap_count(&self) -> u64 {
        self.swaps.load(Ordering::Relaxed)
    }

    /// Publish `fresh` and close the pool it replaces.
    pub async fn swap_in(&self, fresh: DatabaseConnection) {
        let old = self.current.swap(Arc::new(fresh));
        self.swaps.fetch_add(1, Ordering::Relaxed);
        info!(event = "db_pool_swapped", swaps = self.swap_count(), "published fresh database pool");
        // Clones share the underlying sqlx pool; close waits for checked-out connections.
        if let Err(e) = old.as_ref().clone().close().await {
            warn!(error = %e, "closing replaced pool failed");
        }
    }

    async fn reconnect(&self) -> anyhow::Result<()> {
        let fresh = connect_with_config(&self.cfg).await?;
        fresh.ping().await?;
        self.swap_in(fresh).await;
        Ok(())
    }

    /// Spawn the liveness loop. It exits when `cancel` fires.
    pub fn spawn_liveness_probe(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let pool = Arc::clone(self);
        let interval = Duration::from_secs(self.cfg.ping_interval_secs);
        let mut tracker = LivenessTracker::new(self.cfg.reconnect_fail_threshold);

        tokio::spawn(async move {
            info!("db liveness probe started (interval={interval:?}, threshold={})", tracker.threshold);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("db liveness probe stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let ok = match pool.conn().ping().await {
                            Ok(()) => {
                                debug!("db ping ok");
                                true
                            }
                            Err(e) => {
                                warn!(error = %e, failures = tracker.failures + 1, "db ping failed");
                                false
                            }
                        };
                        if tracker.record(ok) {
                            match pool.reconnect().await {
                                Ok(()) => tracker.reset(),
                                Err(e) => error!(error = %e, "db reconnect failed; keeping current pool"),
                            }
                        }
                    }
                }
            }
        })
    }
}

/// Counts consecutive ping failures against a threshold.
#[derive(Debug, Clone)]
pub struct LivenessTracker {
    threshold: u32,
    failures: u32,
}

impl LivenessTracker {
    pub fn new(threshold: u32) -> Self {
        Self { threshold: threshold.max(1), failures: 0 }
    }

    /// Record one probe result; returns true when a reconnect is due.
    pub fn record(&mut self, ok: bool) -> bool {
        if ok {
            self.failures = 0;
            return false;
        }
        self.failures += 1;
        self.failures >= self.threshold
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}
