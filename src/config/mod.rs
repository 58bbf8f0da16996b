//! Static configuration subsystem.
//!
//! # Data Flow
//! ```text
//! reference.toml, application.toml, iep-<account-type>.toml, CONFIG_FORCE_* env
//!     → loader.rs (read & flatten each layer)
//!     → tree.rs (merge with fallback: overrides > overlay > application > reference)
//!     → ConfigTree (immutable, shared by cheap clone)
//!
//! Consumers read through PropertySource:
//!     ConfigTree          static layer
//!     DynamicConfig       remote override layer (see crate::dynamic)
//!     CompositeConfig     named layers, first match wins
//! ```
//!
//! # Design Decisions
//! - Trees are immutable; merging produces a new tree
//! - Composites are append-only and publish their layer list atomically
//! - Missing overlay degrades to defaults, malformed overlay fails the load

pub mod composite;
pub mod env;
pub mod error;
pub mod loader;
pub mod source;
pub mod tree;
pub mod value;

pub use composite::{CompositeConfig, Layer};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use source::PropertySource;
pub use tree::ConfigTree;
pub use value::ConfigValue;
