pub mod capture_recorder;
pub mod types;

pub use capture_recorder::{CaptureRecorder, DEFAULT_ARTIFACT_NAME};
pub use types::{RecordOutcome, RecorderStats, SkipReason};
