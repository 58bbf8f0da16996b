//! Dynamic override resolution.
//!
//! # State Transitions
//! ```text
//! use-dynamic = false  → Disabled (empty forever, nothing spawned)
//! use-dynamic = true
//!     sync-init = true   → one blocking fetch
//!                            ok   → Active(fetched snapshot)
//!                            err  → ConfigError::SyncInit, nothing spawned
//!     sync-init = false  → Active(empty snapshot), first fetch scheduled now
//! Active: fetch ok → swap snapshot; fetch err → keep snapshot, log
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use url::Url;

use crate::config::{ConfigError, ConfigResult, ConfigValue, PropertySource};
use crate::dynamic::fetcher::{PropertiesReader, RemoteFetcher};
use crate::dynamic::poller::Poller;
use crate::dynamic::snapshot::PollingSnapshot;
use crate::dynamic::strategy::PollingStrategy;

pub const USE_DYNAMIC_KEY: &str = "netflix.iep.archaius.use-dynamic";
pub const URL_KEY: &str = "netflix.iep.archaius.url";

/// The remote override layer.
///
/// Always readable: `Disabled` is permanently empty and `Active` returns the
/// last snapshot that was fetched successfully (empty until the first one).
/// Cloning shares the same polling task.
#[derive(Clone, Debug)]
pub enum DynamicConfig {
    Disabled,
    Active(PollingHandle),
}

impl DynamicConfig {
    pub fn is_enabled(&self) -> bool {
        matches!(self, DynamicConfig::Active(_))
    }

    /// The current snapshot. Never blocks.
    pub fn snapshot(&self) -> Arc<PollingSnapshot> {
        match self {
            DynamicConfig::Disabled => Arc::new(PollingSnapshot::empty()),
            DynamicConfig::Active(handle) => handle.snapshot(),
        }
    }

    /// Poll counters; all zero for a disabled layer.
    pub fn stats(&self) -> PollStats {
        match self {
            DynamicConfig::Disabled => PollStats::default(),
            DynamicConfig::Active(handle) => handle.stats(),
        }
    }

    pub fn handle(&self) -> Option<&PollingHandle> {
        match self {
            DynamicConfig::Disabled => None,
            DynamicConfig::Active(handle) => Some(handle),
        }
    }
}

impl PropertySource for DynamicConfig {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        match self {
            DynamicConfig::Disabled => None,
            DynamicConfig::Active(handle) => handle
                .snapshot()
                .get(key)
                .map(|v| ConfigValue::String(v.to_string())),
        }
    }

    fn keys(&self) -> Vec<String> {
        self.snapshot().properties().keys().cloned().collect()
    }
}

/// Fetch outcome counters for the remote layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Successful fetches, including a synchronous init.
    pub update_count: u64,
    /// Failed fetches.
    pub error_count: u64,
    /// Time of the last successful fetch.
    pub last_update: Option<SystemTime>,
}

/// Handle to a running poller.
///
/// The polling task is aborted when the last clone is dropped.
#[derive(Clone)]
pub struct PollingHandle {
    inner: Arc<PollingInner>,
}

struct PollingInner {
    poller: Arc<Poller>,
    strategy: PollingStrategy,
    task: JoinHandle<()>,
}

impl Drop for PollingInner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl PollingHandle {
    pub fn snapshot(&self) -> Arc<PollingSnapshot> {
        self.inner.poller.current()
    }

    pub fn url(&self) -> &Url {
        self.inner.poller.url()
    }

    pub fn strategy(&self) -> PollingStrategy {
        self.inner.strategy
    }

    /// Number of successful fetches, including a synchronous init.
    pub fn update_count(&self) -> u64 {
        self.inner.poller.update_count()
    }

    /// Number of failed fetches.
    pub fn error_count(&self) -> u64 {
        self.inner.poller.error_count()
    }

    /// Time of the last successful fetch.
    pub fn last_update(&self) -> Option<SystemTime> {
        self.snapshot().fetched_at()
    }

    pub fn stats(&self) -> PollStats {
        PollStats {
            update_count: self.update_count(),
            error_count: self.error_count(),
            last_update: self.last_update(),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.inner.task.is_finished()
    }
}

impl fmt::Debug for PollingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingHandle")
            .field("url", &self.url().as_str())
            .field("strategy", &self.inner.strategy)
            .field("updates", &self.update_count())
            .field("errors", &self.error_count())
            .finish()
    }
}

/// Builds the remote override layer from static configuration.
///
/// Polling tasks run on the supplied runtime; fetches run on its blocking pool.
pub struct DynamicConfigResolver {
    runtime: Handle,
    fetcher: Option<Arc<dyn RemoteFetcher>>,
}

impl DynamicConfigResolver {
    /// Resolver using [`PropertiesReader`] for fetches.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            fetcher: None,
        }
    }

    /// Replace the default fetcher.
    pub fn with_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: RemoteFetcher + 'static,
    {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Resolve the override layer.
    ///
    /// With `sync-init` enabled this blocks the calling thread on one fetch.
    /// Safe to call from inside a runtime: the default reader performs its
    /// HTTP work on a separate OS thread. A custom fetcher blocks whichever
    /// thread calls this.
    pub fn resolve(&self, config: &dyn PropertySource) -> ConfigResult<DynamicConfig> {
        if !config.get_bool(USE_DYNAMIC_KEY)? {
            tracing::info!("Dynamic configuration disabled");
            return Ok(DynamicConfig::Disabled);
        }

        let url = config.get_url(URL_KEY)?;
        let strategy = PollingStrategy::from_config(config)?;
        let fetcher: Arc<dyn RemoteFetcher> = match &self.fetcher {
            Some(fetcher) => fetcher.clone(),
            None => Arc::new(PropertiesReader::new()),
        };

        let poller = Arc::new(Poller::new(url, fetcher));
        if strategy.sync_init() {
            poller.poll_once().map_err(|e| {
                tracing::error!(url = %poller.url(), error = %e, "Synchronous dynamic config init failed");
                ConfigError::SyncInit(e)
            })?;
        }

        let task = poller.clone().spawn(&self.runtime, strategy);
        tracing::info!(
            url = %poller.url(),
            properties = poller.current().len(),
            "Dynamic configuration enabled"
        );

        Ok(DynamicConfig::Active(PollingHandle {
            inner: Arc::new(PollingInner {
                poller,
                strategy,
                task,
            }),
        }))
    }
}

impl fmt::Debug for DynamicConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicConfigResolver")
            .field("custom_fetcher", &self.fetcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigTree;
    use crate::dynamic::fetcher::{FetchError, FetchResult};
    use crate::dynamic::strategy::{POLLING_INTERVAL_KEY, SYNC_INIT_KEY};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::runtime::Runtime;

    fn runtime() -> Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    fn dynamic_config(interval: &str, sync_init: bool) -> ConfigTree {
        [
            (USE_DYNAMIC_KEY, "true".to_string()),
            (URL_KEY, "http://cfg/x.properties".to_string()),
            (POLLING_INTERVAL_KEY, interval.to_string()),
            (SYNC_INIT_KEY, sync_init.to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(&Url) -> FetchResult<PollingSnapshot> + Send + Sync + 'static {
        move |_: &Url| -> FetchResult<PollingSnapshot> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok([("feature.x.enabled", "true")].into_iter().collect())
        }
    }

    #[test]
    fn test_disabled_never_fetches() {
        let rt = runtime();
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = DynamicConfigResolver::new(rt.handle().clone())
            .with_fetcher(counting_fetcher(calls.clone()));

        let config: ConfigTree = [(USE_DYNAMIC_KEY, false)].into_iter().collect();
        let dynamic = resolver.resolve(&config).unwrap();

        assert!(matches!(dynamic, DynamicConfig::Disabled));
        assert!(dynamic.snapshot().is_empty());
        assert!(dynamic.keys().is_empty());
        assert_eq!(dynamic.stats(), PollStats::default());
        assert_eq!(dynamic.stats().last_update, None);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disabled_ignores_other_keys() {
        let rt = runtime();
        let resolver = DynamicConfigResolver::new(rt.handle().clone());
        let config: ConfigTree = [(USE_DYNAMIC_KEY, "false"), (URL_KEY, "not a url")]
            .into_iter()
            .collect();
        assert!(!resolver.resolve(&config).unwrap().is_enabled());
    }

    #[test]
    fn test_missing_use_dynamic() {
        let rt = runtime();
        let resolver = DynamicConfigResolver::new(rt.handle().clone());
        let err = resolver.resolve(&ConfigTree::empty()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(key) if key == USE_DYNAMIC_KEY));
    }

    #[test]
    fn test_invalid_url() {
        let rt = runtime();
        let resolver = DynamicConfigResolver::new(rt.handle().clone());
        let config: ConfigTree = [
            (USE_DYNAMIC_KEY, "true"),
            (URL_KEY, "::not a url"),
            (POLLING_INTERVAL_KEY, "30s"),
            (SYNC_INIT_KEY, "false"),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            resolver.resolve(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_zero_interval() {
        let rt = runtime();
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = DynamicConfigResolver::new(rt.handle().clone())
            .with_fetcher(counting_fetcher(calls.clone()));
        assert!(matches!(
            resolver.resolve(&dynamic_config("0s", true)),
            Err(ConfigError::InvalidInterval(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sync_init_success_is_immediately_visible() {
        let rt = runtime();
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = DynamicConfigResolver::new(rt.handle().clone())
            .with_fetcher(counting_fetcher(calls.clone()));

        let dynamic = resolver.resolve(&dynamic_config("60s", true)).unwrap();
        assert!(dynamic.is_enabled());
        assert_eq!(dynamic.get_string("feature.x.enabled").unwrap(), "true");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = dynamic.stats();
        assert_eq!(stats.update_count, 1);
        assert_eq!(stats.error_count, 0);
        assert!(stats.last_update.is_some());

        let handle = dynamic.handle().unwrap();
        assert_eq!(handle.update_count(), 1);
        assert!(handle.last_update().is_some());
        assert!(handle.is_running());
    }

    #[test]
    fn test_sync_init_failure_is_fatal() {
        let rt = runtime();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let resolver = DynamicConfigResolver::new(rt.handle().clone()).with_fetcher(
            move |_: &Url| -> FetchResult<PollingSnapshot> {
                c.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Other("connection refused".into()))
            },
        );

        let err = resolver.resolve(&dynamic_config("20ms", true)).unwrap_err();
        assert!(matches!(err, ConfigError::SyncInit(FetchError::Other(_))));

        // No poller was left behind.
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stats_count_failures() {
        let rt = runtime();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let resolver = DynamicConfigResolver::new(rt.handle().clone()).with_fetcher(
            move |_: &Url| -> FetchResult<PollingSnapshot> {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok([("a", "1")].into_iter().collect())
                } else {
                    Err(FetchError::Other("down".into()))
                }
            },
        );

        let dynamic = resolver.resolve(&dynamic_config("10ms", true)).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while dynamic.stats().error_count < 2 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }

        let stats = dynamic.stats();
        assert_eq!(stats.update_count, 1);
        assert!(stats.error_count >= 2);
        assert_eq!(stats.last_update, dynamic.snapshot().fetched_at());
    }

    #[test]
    fn test_drop_stops_polling() {
        let rt = runtime();
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = DynamicConfigResolver::new(rt.handle().clone())
            .with_fetcher(counting_fetcher(calls.clone()));

        let dynamic = resolver.resolve(&dynamic_config("10ms", false)).unwrap();
        std::thread::sleep(Duration::from_millis(60));
        drop(dynamic);

        std::thread::sleep(Duration::from_millis(30));
        let settled = calls.load(Ordering::SeqCst);
        assert!(settled > 0);
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(calls.load(Ordering::SeqCst), settled);
    }
}
