//! The process-wide capture proxy handle.
//!
//! [`CaptureProxy`] is constructed eagerly but starts its engine lazily, on
//! the first [`acquire`](CaptureProxy::acquire). It is shared by `Arc`
//! between whoever routes traffic through the proxy and the
//! [`CaptureRecorder`](crate::recorder::CaptureRecorder) that exports it.
//!
//! State machine:
//!
//! ```text
//! Idle ──acquire ok──▶ Running ──(acquire)──▶ Running
//!   │
//!   └──acquire err──▶ Failed ──(acquire)──▶ Failed
//! ```
//!
//! There is no stop: the engine lives until the process exits.

use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::Mutex;

use crate::error_handling::types::{EngineError, ProxyStartupError};
use crate::har::Har;

use super::engine::{ProxyEngine, RunningProxy};
use super::types::{SnapshotMode, DEFAULT_CAPTURE};

enum ProxyState {
    Idle,
    Running(Arc<dyn RunningProxy>),
    Failed(String),
}

pub struct CaptureProxy {
    engine: Arc<dyn ProxyEngine>,
    state: Mutex<ProxyState>,
}

impl CaptureProxy {
    pub fn new(engine: Arc<dyn ProxyEngine>) -> Self {
        Self {
            engine,
            state: Mutex::new(ProxyState::Idle),
        }
    }

    /// Returns the running proxy, starting it on first use.
    ///
    /// The state lock is held across the engine start, so concurrent first
    /// callers wait for the single start instead of racing it. A failed
    /// start is latched: later calls get [`ProxyStartupError::Unavailable`]
    /// and the engine is not contacted again.
    pub async fn acquire(&self) -> Result<Arc<dyn RunningProxy>, ProxyStartupError> {
        let mut state = self.state.lock().await;
        match &*state {
            ProxyState::Running(proxy) => return Ok(Arc::clone(proxy)),
            ProxyState::Failed(reason) => {
                debug!("Capture proxy previously failed, not retrying");
                return Err(ProxyStartupError::Unavailable(reason.clone()));
            }
            ProxyState::Idle => {}
        }

        info!("Starting capture proxy on {}", self.engine.host());
        match self.launch().await {
            Ok(proxy) => {
                info!(
                    "Capture proxy listening on {}:{}",
                    self.engine.host(),
                    proxy.port()
                );
                *state = ProxyState::Running(Arc::clone(&proxy));
                Ok(proxy)
            }
            Err(e) => {
                error!(
                    "Capture proxy failed to start, no traffic will be captured for the rest of this run: {}",
                    e
                );
                *state = ProxyState::Failed(e.to_string());
                Err(ProxyStartupError::EngineFailed(e))
            }
        }
    }

    async fn launch(&self) -> Result<Arc<dyn RunningProxy>, EngineError> {
        let proxy: Arc<dyn RunningProxy> = Arc::from(self.engine.start(0).await?);
        proxy.enable_capture(&DEFAULT_CAPTURE).await?;
        Ok(proxy)
    }

    /// The running proxy, if something has already acquired it.
    pub async fn current(&self) -> Option<Arc<dyn RunningProxy>> {
        match &*self.state.lock().await {
            ProxyState::Running(proxy) => Some(Arc::clone(proxy)),
            _ => None,
        }
    }

    pub async fn is_acquired(&self) -> bool {
        self.current().await.is_some()
    }

    pub async fn port(&self) -> Option<u16> {
        self.current().await.map(|p| p.port())
    }

    /// `host:port` clients should use as their HTTP proxy.
    pub async fn proxy_address(&self) -> Option<String> {
        self.port()
            .await
            .map(|port| format!("{}:{}", self.engine.host(), port))
    }

    /// Exports the recorded traffic. `Ok(None)` when the proxy was never
    /// acquired; never starts it.
    pub async fn snapshot(&self, mode: SnapshotMode) -> Result<Option<Har>, EngineError> {
        let Some(proxy) = self.current().await else {
            return Ok(None);
        };
        let har = match mode {
            SnapshotMode::Cumulative => proxy.har().await?,
            SnapshotMode::PerUnit => proxy.new_har().await?,
        };
        Ok(Some(har))
    }
}
