use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Parts of each exchange the engine should record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureType {
    RequestHeaders,
    RequestContent,
    ResponseHeaders,
    ResponseContent,
}

/// Capture enabled on every freshly started proxy.
pub const DEFAULT_CAPTURE: [CaptureType; 2] =
    [CaptureType::RequestContent, CaptureType::ResponseContent];

/// How a snapshot relates to earlier snapshots of the same proxy.
///
/// `Cumulative` returns everything recorded since the proxy started, so the
/// artifact for unit N also holds traffic from units 1..N-1. `PerUnit`
/// asks the engine to start a new archive on every snapshot instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotMode {
    #[default]
    Cumulative,
    PerUnit,
}
