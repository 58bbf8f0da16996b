//! Immutable, flattened configuration trees.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::source::PropertySource;
use crate::config::value::ConfigValue;

/// An immutable mapping from dotted keys to values.
///
/// Nested TOML tables are flattened on parse, so `[netflix.iep.env]` with
/// `account-type = "test"` is stored under `netflix.iep.env.account-type`.
/// Cloning is cheap; the entries are shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    entries: Arc<BTreeMap<String, ConfigValue>>,
}

impl ConfigTree {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a TOML document into a flattened tree.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(content)?;
        let mut entries = BTreeMap::new();
        flatten_into(&mut entries, None, table);
        Ok(Self {
            entries: Arc::new(entries),
        })
    }

    /// A new tree where keys in `self` win and `fallback` fills the rest.
    pub fn with_fallback(&self, fallback: &ConfigTree) -> ConfigTree {
        if fallback.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return fallback.clone();
        }
        let mut merged = (*fallback.entries).clone();
        merged.extend(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            entries: Arc::new(merged),
        }
    }

    /// Look up a key without copying the value.
    pub fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Entries whose key starts with `prefix.`, with the prefix stripped.
    pub fn subtree(&self, prefix: &str) -> ConfigTree {
        let dotted = format!("{}.", prefix);
        let entries = self
            .entries
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&dotted).map(|rest| (rest.to_string(), v.clone())))
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten_into(
    entries: &mut BTreeMap<String, ConfigValue>,
    prefix: Option<&str>,
    table: toml::Table,
) {
    for (key, value) in table {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key,
        };
        match value {
            toml::Value::Table(nested) => flatten_into(entries, Some(&path), nested),
            leaf => {
                entries.insert(path, ConfigValue::from_toml(leaf));
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigTree
where
    K: Into<String>,
    V: Into<ConfigValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl PropertySource for ConfigTree {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.entries.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
