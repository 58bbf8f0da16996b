//! Refresh cadence for the remote override layer.

use std::time::Duration;

use crate::config::{ConfigError, ConfigResult, PropertySource};

pub const POLLING_INTERVAL_KEY: &str = "netflix.iep.archaius.polling-interval";
pub const SYNC_INIT_KEY: &str = "netflix.iep.archaius.sync-init";

/// Fixed-interval polling, optionally blocking on the first fetch.
///
/// Read once when the resolver is built and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingStrategy {
    interval: Duration,
    sync_init: bool,
}

impl PollingStrategy {
    /// Fails with [`ConfigError::InvalidInterval`] for a zero interval.
    pub fn fixed(interval: Duration, sync_init: bool) -> ConfigResult<Self> {
        if interval.is_zero() {
            return Err(ConfigError::InvalidInterval(POLLING_INTERVAL_KEY.to_string()));
        }
        Ok(Self { interval, sync_init })
    }

    /// Read `polling-interval` and `sync-init`; both are required.
    pub fn from_config(config: &dyn PropertySource) -> ConfigResult<Self> {
        let interval = config.get_duration(POLLING_INTERVAL_KEY)?;
        let sync_init = config.get_bool(SYNC_INIT_KEY)?;
        Self::fixed(interval, sync_init)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sync_init(&self) -> bool {
        self.sync_init
    }

    /// Delay before the first scheduled fetch.
    ///
    /// A synchronous init already fetched, so the schedule starts one interval
    /// later; otherwise the first fetch runs right away.
    pub fn initial_delay(&self) -> Duration {
        if self.sync_init {
            self.interval
        } else {
            Duration::ZERO
        }
    }
}
