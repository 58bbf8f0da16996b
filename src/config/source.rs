//! The read interface shared by every configuration layer.

use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::value::ConfigValue;

/// A read-only view over dotted configuration keys.
///
/// Implemented by static trees, the dynamic override layer and composites,
/// so a composite can hold any mix of them as named layers.
pub trait PropertySource: Send + Sync {
    /// Look up a single key.
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// All keys this source currently defines, sorted.
    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn require(&self, key: &str) -> ConfigResult<ConfigValue> {
        self.get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn get_string(&self, key: &str) -> ConfigResult<String> {
        let value = self.require(key)?;
        value.as_string().ok_or_else(|| wrong_type(key, &value, "string"))
    }

    fn get_bool(&self, key: &str) -> ConfigResult<bool> {
        let value = self.require(key)?;
        value.as_bool().ok_or_else(|| wrong_type(key, &value, "boolean"))
    }

    fn get_i64(&self, key: &str) -> ConfigResult<i64> {
        let value = self.require(key)?;
        value.as_i64().ok_or_else(|| wrong_type(key, &value, "integer"))
    }

    fn get_f64(&self, key: &str) -> ConfigResult<f64> {
        let value = self.require(key)?;
        value.as_f64().ok_or_else(|| wrong_type(key, &value, "number"))
    }

    fn get_duration(&self, key: &str) -> ConfigResult<Duration> {
        let value = self.require(key)?;
        value.as_duration().ok_or_else(|| wrong_type(key, &value, "duration"))
    }

    fn get_url(&self, key: &str) -> ConfigResult<Url> {
        let raw = self.get_string(key)?;
        Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
            key: key.to_string(),
            value: raw,
            source,
        })
    }
}

fn wrong_type(key: &str, value: &ConfigValue, expected: &'static str) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

impl<T: PropertySource + ?Sized> PropertySource for Arc<T> {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        (**self).get(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}
