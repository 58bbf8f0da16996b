//! Remote override subsystem.
//!
//! # Data Flow
//! ```text
//! static ConfigTree
//!     → resolver.rs (use-dynamic? url, polling-interval, sync-init)
//!     → strategy.rs (fixed interval, optional blocking first fetch)
//!     → poller.rs (tokio interval, fetch on blocking pool)
//!         → fetcher.rs (http(s):// or file://)
//!         → properties.rs (key=value list)
//!         → snapshot.rs (immutable PollingSnapshot)
//!     → atomic swap of Arc<PollingSnapshot>
//!     → readers see last good snapshot
//! ```
//!
//! # Design Decisions
//! - Disabled and active layers are distinct variants of `DynamicConfig`
//! - Fetch failures after startup are logged and counted, never surfaced
//! - Reads never block; they load the current snapshot pointer

pub mod fetcher;
pub(crate) mod poller;
pub mod properties;
pub mod resolver;
pub mod snapshot;
pub mod strategy;

pub use fetcher::{FetchError, FetchResult, PropertiesReader, RemoteFetcher};
pub use properties::{parse_properties, PropertiesError};
pub use resolver::{DynamicConfig, DynamicConfigResolver, PollStats, PollingHandle};
pub use snapshot::PollingSnapshot;
pub use strategy::PollingStrategy;
