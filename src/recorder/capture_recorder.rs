//! Policy-driven capture recorder.
//!
//! `CaptureRecorder` listens to the unit-of-work lifecycle and, when the
//! [`RecordingPolicy`] asks for it, exports the proxy's HAR into a file
//! handed out by the [`DiagnosticsSink`].
//!
//! Writing an artifact is best effort. Every failure past the policy check
//! (sink, snapshot, serialization, disk) is logged at ERROR and counted in
//! [`RecorderStats::failed`], and never reaches the unit of work.
//!
//! ```no_run
//! use std::sync::Arc;
//! use harcap::diagnostics::FileDiagnostics;
//! use harcap::lifecycle::{UnitOfWork, UnitRunner};
//! use harcap::proxy::{BrowserMobEngine, CaptureProxy};
//! use harcap::recorder::CaptureRecorder;
//! use harcap::recording_policy::RecordingPolicy;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let proxy = Arc::new(CaptureProxy::new(Arc::new(BrowserMobEngine::new("http://127.0.0.1:8080")?)));
//! let sink = Arc::new(FileDiagnostics::new("diagnostics")?);
//! let recorder = Arc::new(CaptureRecorder::new(RecordingPolicy::Always, proxy.clone(), sink));
//! let runner = UnitRunner::new().with_observer(recorder);
//!
//! let unit = UnitOfWork::new("login works");
//! proxy.acquire().await?;
//! let _ = runner.run(&unit, async { Ok::<(), String>(()) }).await;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};

use crate::diagnostics::DiagnosticsSink;
use crate::error_handling::types::ArtifactWriteError;
use crate::lifecycle::{Outcome, UnitObserver, UnitOfWork};
use crate::proxy::{CaptureProxy, SnapshotMode};
use crate::recording_policy::RecordingPolicy;

use super::types::{RecordOutcome, RecorderStats, SkipReason};

pub const DEFAULT_ARTIFACT_NAME: &str = "traffic.har";

pub struct CaptureRecorder {
    policy: RecordingPolicy,
    proxy: Arc<CaptureProxy>,
    sink: Arc<dyn DiagnosticsSink>,
    artifact_name: String,
    snapshot_mode: SnapshotMode,
    written: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl CaptureRecorder {
    pub fn new(
        policy: RecordingPolicy,
        proxy: Arc<CaptureProxy>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        debug!("CaptureRecorder created with policy {}", policy);
        Self {
            policy,
            proxy,
            sink,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            snapshot_mode: SnapshotMode::default(),
            written: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        }
    }

    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = name.into();
        self
    }

    pub fn with_snapshot_mode(mut self, mode: SnapshotMode) -> Self {
        self.snapshot_mode = mode;
        self
    }

    pub fn policy(&self) -> RecordingPolicy {
        self.policy
    }

    /// Whether any outcome can ever be persisted. Clients use this to decide
    /// if they should route through the proxy at all.
    pub fn is_capture_enabled(&self) -> bool {
        self.policy.is_recording_enabled()
    }

    pub fn stats(&self) -> RecorderStats {
        RecorderStats {
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }

    /// Applies the policy to `outcome` and captures if it matches.
    pub async fn record_outcome(&self, unit: &UnitOfWork, outcome: &Outcome) -> RecordOutcome {
        let wanted = match outcome {
            Outcome::Success => self.policy.save_on_success(),
            Outcome::Failure(_) => self.policy.save_on_failure(),
        };
        if !wanted {
            debug!("[{}] policy {} declines capture", unit.label, self.policy);
            return self.skip(SkipReason::PolicyDeclined);
        }
        self.capture_and_write(unit).await
    }

    /// Exports the current HAR for `unit`, skipping silently if the proxy
    /// was never acquired. Never fails.
    pub async fn capture_and_write(&self, unit: &UnitOfWork) -> RecordOutcome {
        if !self.proxy.is_acquired().await {
            debug!("[{}] capture proxy never acquired, nothing to record", unit.label);
            return self.skip(SkipReason::ProxyNotAcquired);
        }

        match self.write_artifact(unit).await {
            Ok(Some(path)) => {
                self.written.fetch_add(1, Ordering::Relaxed);
                info!("[{}] HAR written to {}", unit.label, path.display());
                RecordOutcome::Written(path)
            }
            Ok(None) => self.skip(SkipReason::ProxyNotAcquired),
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!("[{}] Unable to write HAR file: {}", unit.label, e);
                RecordOutcome::Failed(e.to_string())
            }
        }
    }

    async fn write_artifact(&self, unit: &UnitOfWork) -> Result<Option<PathBuf>, ArtifactWriteError> {
        let path = self
            .sink
            .touch(unit, &self.artifact_name)
            .map_err(ArtifactWriteError::SinkFailed)?;

        match self.export_into(unit, &path).await {
            Ok(true) => Ok(Some(path)),
            Ok(false) => {
                discard_placeholder(unit, &path);
                Ok(None)
            }
            Err(e) => {
                discard_placeholder(unit, &path);
                Err(e)
            }
        }
    }

    /// Snapshots the proxy into `path`. `Ok(false)` when there was nothing
    /// to snapshot.
    async fn export_into(&self, unit: &UnitOfWork, path: &Path) -> Result<bool, ArtifactWriteError> {
        let har = match self.proxy.snapshot(self.snapshot_mode).await {
            Ok(Some(har)) => har,
            Ok(None) => return Ok(false),
            Err(e) => return Err(ArtifactWriteError::SnapshotFailed(e)),
        };
        debug!("[{}] snapshot holds {} entries", unit.label, har.entry_count());

        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || har.write_to(&target))
            .await
            .map_err(|e| ArtifactWriteError::IoError(std::io::Error::other(e)))??;
        Ok(true)
    }

    fn skip(&self, reason: SkipReason) -> RecordOutcome {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        RecordOutcome::Skipped(reason)
    }
}

/// Removes the empty file the sink created for an artifact that never got
/// written, so a missing HAR always means nothing was recorded.
fn discard_placeholder(unit: &UnitOfWork, path: &Path) {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == 0 => {
            if let Err(e) = fs::remove_file(path) {
                warn!("[{}] Could not remove empty {}: {}", unit.label, path.display(), e);
            }
        }
        _ => {}
    }
}

#[async_trait]
impl UnitObserver for CaptureRecorder {
    async fn on_start(&self, unit: &UnitOfWork) {
        // Capture is global once the proxy is up; nothing to arm per unit.
        debug!("[{}] recorder watching unit {}", unit.label, unit.id);
    }

    async fn on_success(&self, unit: &UnitOfWork) {
        self.record_outcome(unit, &Outcome::Success).await;
    }

    async fn on_failure(&self, unit: &UnitOfWork, cause: &str) {
        self.record_outcome(unit, &Outcome::Failure(cause.to_string()))
            .await;
    }
}
