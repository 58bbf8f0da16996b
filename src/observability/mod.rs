//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config loader, resolver, poller produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (poll outcome counters, snapshot size gauge)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber or a metrics
//!   recorder is left to the host binary
//! - `init_logging` is a convenience for hosts without their own setup

pub mod logging;
pub mod metrics;
