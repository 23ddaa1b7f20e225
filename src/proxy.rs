//! Capture proxy subsystem.
//!
//! - `engine`: the traits an external proxy engine is driven through.
//! - `browsermob`: adapter for a BrowserMob Proxy REST server.
//! - `handle`: [`CaptureProxy`], the lazily started, once-per-process handle.
//! - `types`: capture granularity and snapshot modes.

pub mod browsermob;
pub mod engine;
pub mod handle;
pub mod types;

pub use browsermob::BrowserMobEngine;
pub use engine::{ProxyEngine, RunningProxy};
pub use handle::CaptureProxy;
pub use types::{CaptureType, SnapshotMode};
