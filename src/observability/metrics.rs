//! Metrics for the remote override poller.
//!
//! # Metrics
//! - `iep_archaius_polls_total` (counter): fetch attempts by `outcome`
//! - `iep_archaius_snapshot_size` (gauge): properties in the current snapshot
//!
//! Recorded through the `metrics` facade; they are no-ops until the host
//! installs a recorder.

pub const POLL_SUCCESS: &str = "success";
pub const POLL_FAILURE: &str = "failure";

pub fn record_poll(outcome: &'static str) {
    ::metrics::counter!("iep_archaius_polls_total", "outcome" => outcome).increment(1);
}

pub fn record_snapshot_size(size: usize) {
    ::metrics::gauge!("iep_archaius_snapshot_size").set(size as f64);
}
