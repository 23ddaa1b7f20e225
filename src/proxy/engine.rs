//! Seam to the external proxy engine.
//!
//! The engine is opaque: it can start listening on a port, record
//! request/response content, and export what it recorded as a HAR document.
//! Nothing else is asked of it.

use async_trait::async_trait;

use crate::error_handling::types::EngineError;
use crate::har::Har;

use super::types::CaptureType;

#[async_trait]
pub trait ProxyEngine: Send + Sync {
    /// Starts a proxy listening on `port`; 0 lets the engine pick one.
    async fn start(&self, port: u16) -> Result<Box<dyn RunningProxy>, EngineError>;

    /// Host clients should use to reach proxies started by this engine.
    fn host(&self) -> &str;
}

#[async_trait]
pub trait RunningProxy: Send + Sync {
    fn port(&self) -> u16;

    async fn enable_capture(&self, types: &[CaptureType]) -> Result<(), EngineError>;

    /// Everything recorded since capture was enabled. Does not reset.
    async fn har(&self) -> Result<Har, EngineError>;

    /// Returns what was recorded so far and starts a new, empty archive.
    async fn new_har(&self) -> Result<Har, EngineError>;
}
