//! Platform configuration bootstrap.
//!
//! Builds the three configuration objects a service consumes, once, at
//! startup. Callers keep the returned [`PlatformConfig`] and pass references
//! to whatever needs configuration.

use crate::config::{CompositeConfig, ConfigLoader, ConfigResult, ConfigTree};
use crate::dynamic::{DynamicConfig, DynamicConfigResolver};

/// Name of the static layer in composites.
pub const STATIC_LAYER: &str = "STATIC";

/// Name of the remote override layer in composites.
pub const REMOTE_LAYER: &str = "REMOTE";

#[derive(Debug)]
pub struct PlatformConfig {
    static_config: ConfigTree,
    application: CompositeConfig,
    remote: DynamicConfig,
}

impl PlatformConfig {
    /// Load the static tree, resolve the remote layer and assemble composites.
    pub fn bootstrap(loader: &ConfigLoader, resolver: &DynamicConfigResolver) -> ConfigResult<Self> {
        let static_config = loader.load()?;
        tracing::info!(
            dir = %loader.dir().display(),
            keys = static_config.len(),
            "Static configuration loaded"
        );
        Self::from_static(static_config, resolver)
    }

    /// Assemble from an already loaded static tree.
    pub fn from_static(static_config: ConfigTree, resolver: &DynamicConfigResolver) -> ConfigResult<Self> {
        let remote = resolver.resolve(&static_config)?;

        let application = CompositeConfig::new();
        application.add_config(STATIC_LAYER, static_config.clone())?;

        Ok(Self {
            static_config,
            application,
            remote,
        })
    }

    pub fn static_config(&self) -> &ConfigTree {
        &self.static_config
    }

    /// Composite holding only the static layer.
    pub fn application_layer(&self) -> &CompositeConfig {
        &self.application
    }

    /// Overrides only.
    pub fn remote_layer(&self) -> &DynamicConfig {
        &self.remote
    }

    /// A composite reading overrides first, then the static layer.
    pub fn effective(&self) -> ConfigResult<CompositeConfig> {
        let composite = CompositeConfig::new();
        composite.add_config(REMOTE_LAYER, self.remote.clone())?;
        composite.add_config(STATIC_LAYER, self.static_config.clone())?;
        Ok(composite)
    }
}
