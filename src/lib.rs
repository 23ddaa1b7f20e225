pub mod configuration;
pub mod diagnostics;
pub mod error_handling;
pub mod har;
pub mod lifecycle;
pub mod proxy;
pub mod recorder;
pub mod recording_policy;

pub use configuration::Config;
pub use har::Har;
pub use lifecycle::{Outcome, UnitObserver, UnitOfWork, UnitRunner};
pub use proxy::CaptureProxy;
pub use recorder::CaptureRecorder;
pub use recording_policy::RecordingPolicy;
