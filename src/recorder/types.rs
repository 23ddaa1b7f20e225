//! Result types reported by the capture recorder.

use std::path::PathBuf;

/// Why a capture-and-write did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The policy does not persist this outcome.
    PolicyDeclined,
    /// Nothing ever acquired the proxy, so there is no traffic to export.
    ProxyNotAcquired,
}

/// What a single capture-and-write attempt ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Skipped(SkipReason),
    Written(PathBuf),
    /// Already logged; kept only so callers and tests can count it.
    Failed(String),
}

/// Running totals for one recorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub written: usize,
    pub failed: usize,
    pub skipped: usize,
}
