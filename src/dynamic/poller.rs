//! Background polling of the remote property source.
//!
//! # Responsibilities
//! - Run one fetch per interval off the async worker threads
//! - Publish successful snapshots with an atomic swap
//! - Keep the last good snapshot when a fetch fails

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use url::Url;

use crate::dynamic::fetcher::{FetchResult, RemoteFetcher};
use crate::dynamic::snapshot::PollingSnapshot;
use crate::dynamic::strategy::PollingStrategy;
use crate::observability::metrics;

pub(crate) struct Poller {
    url: Url,
    fetcher: Arc<dyn RemoteFetcher>,
    current: ArcSwap<PollingSnapshot>,
    updates: AtomicU64,
    errors: AtomicU64,
}

impl Poller {
    pub(crate) fn new(url: Url, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self {
            url,
            fetcher,
            current: ArcSwap::from_pointee(PollingSnapshot::empty()),
            updates: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn current(&self) -> Arc<PollingSnapshot> {
        self.current.load_full()
    }

    pub(crate) fn update_count(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub(crate) fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Fetch once and publish the result. Blocks the calling thread.
    pub(crate) fn poll_once(&self) -> FetchResult<()> {
        match self.fetcher.fetch(&self.url) {
            Ok(snapshot) => {
                let size = snapshot.len();
                self.current.store(Arc::new(snapshot));
                self.updates.fetch_add(1, Ordering::Relaxed);
                metrics::record_poll(metrics::POLL_SUCCESS);
                metrics::record_snapshot_size(size);
                tracing::debug!(url = %self.url, properties = size, "Dynamic config snapshot updated");
                Ok(())
            }
            Err(e) => {
                self.record_error();
                Err(e)
            }
        }
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        metrics::record_poll(metrics::POLL_FAILURE);
    }

    /// Start the polling loop on `runtime`.
    pub(crate) fn spawn(self: Arc<Self>, runtime: &Handle, strategy: PollingStrategy) -> JoinHandle<()> {
        runtime.spawn(self.run(strategy))
    }

    async fn run(self: Arc<Self>, strategy: PollingStrategy) {
        tracing::info!(
            url = %self.url,
            interval_ms = strategy.interval().as_millis() as u64,
            sync_init = strategy.sync_init(),
            "Dynamic config poller starting"
        );

        let start = Instant::now() + strategy.initial_delay();
        let mut ticker = time::interval_at(start, strategy.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let poller = self.clone();
            match task::spawn_blocking(move || poller.poll_once()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(
                        url = %self.url,
                        error = %e,
                        "Dynamic config poll failed, keeping previous snapshot"
                    );
                }
                Err(e) => {
                    self.record_error();
                    tracing::error!(url = %self.url, error = %e, "Dynamic config poll task aborted");
                }
            }
        }
    }
}
