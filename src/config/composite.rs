//! Composite configuration built from ordered, named layers.

use arc_swap::ArcSwap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::source::PropertySource;
use crate::config::value::ConfigValue;

/// A named layer inside a composite.
#[derive(Clone)]
pub struct Layer {
    name: String,
    source: Arc<dyn PropertySource>,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Arc<dyn PropertySource> {
        &self.source
    }
}

/// Ordered collection of named layers; the first layer defining a key wins.
///
/// Layers are append-only. Each append publishes a new layer list through an
/// atomic swap, so concurrent lookups see either the old or the new list and
/// never a partially updated one.
pub struct CompositeConfig {
    layers: ArcSwap<Vec<Layer>>,
}

impl CompositeConfig {
    pub fn new() -> Self {
        Self {
            layers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Append a layer after all existing ones.
    ///
    /// Fails with [`ConfigError::DuplicateLayer`] if the name is taken.
    pub fn add_config<S>(&self, name: impl Into<String>, source: S) -> ConfigResult<()>
    where
        S: PropertySource + 'static,
    {
        let layer = Layer {
            name: name.into(),
            source: Arc::new(source),
        };

        loop {
            let current = self.layers.load_full();
            if current.iter().any(|l| l.name == layer.name) {
                return Err(ConfigError::DuplicateLayer(layer.name));
            }

            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(layer.clone());

            let previous = self.layers.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &current) {
                tracing::debug!(layer = %layer.name, position = current.len(), "Added config layer");
                return Ok(());
            }
        }
    }

    /// Layer names in lookup order.
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.load().iter().map(|l| l.name.clone()).collect()
    }

    pub fn layer(&self, name: &str) -> Option<Arc<dyn PropertySource>> {
        self.layers
            .load()
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.source.clone())
    }

    pub fn layers(&self) -> Arc<Vec<Layer>> {
        self.layers.load_full()
    }

    pub fn len(&self) -> usize {
        self.layers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.load().is_empty()
    }
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompositeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeConfig")
            .field("layers", &self.layer_names())
            .finish()
    }
}

impl PropertySource for CompositeConfig {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.layers.load().iter().find_map(|l| l.source.get(key))
    }

    fn keys(&self) -> Vec<String> {
        let layers = self.layers.load();
        let keys: BTreeSet<String> = layers.iter().flat_map(|l| l.source.keys()).collect();
        keys.into_iter().collect()
    }
}
