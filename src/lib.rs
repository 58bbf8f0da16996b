//! Layered platform configuration with remotely polled overrides.
//!
//! # Architecture Overview
//!
//! ```text
//!   reference.toml ─┐
//!   application.toml┼─▶ config::ConfigLoader ─▶ ConfigTree (static)
//!   iep-<acct>.toml ┤                              │
//!   CONFIG_FORCE_* ─┘                              ├─▶ application layer [STATIC]
//!                                                  │
//!                                                  ▼
//!                               dynamic::DynamicConfigResolver
//!                                  │  use-dynamic = false → Disabled
//!                                  │  use-dynamic = true  → Active
//!                                  ▼
//!                  poller (tokio interval) ─▶ RemoteFetcher ─▶ PollingSnapshot
//!                                  │
//!                                  ▼
//!                          remote layer [REMOTE]
//! ```

pub mod config;
pub mod dynamic;
pub mod observability;
pub mod platform;

pub use config::{CompositeConfig, ConfigError, ConfigLoader, ConfigTree, PropertySource};
pub use dynamic::{DynamicConfig, DynamicConfigResolver, PollingSnapshot, RemoteFetcher};
pub use platform::PlatformConfig;
