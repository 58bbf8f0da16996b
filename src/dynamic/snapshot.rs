//! Point-in-time results of polling the remote property source.

use std::collections::BTreeMap;
use std::time::SystemTime;

/// An immutable, flat property set fetched from the remote source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollingSnapshot {
    properties: BTreeMap<String, String>,
    fetched_at: Option<SystemTime>,
}

impl PollingSnapshot {
    /// Snapshot stamped with the current time.
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self {
            properties,
            fetched_at: Some(SystemTime::now()),
        }
    }

    /// The "nothing fetched yet" snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// When this snapshot was fetched; `None` for the initial empty snapshot.
    pub fn fetched_at(&self) -> Option<SystemTime> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PollingSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
