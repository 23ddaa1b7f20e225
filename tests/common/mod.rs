#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use harcap::diagnostics::{DiagnosticsSink, FileDiagnostics};
use harcap::error_handling::types::{EngineError, SinkError};
use harcap::har::Har;
use harcap::lifecycle::UnitOfWork;
use harcap::proxy::{CaptureType, ProxyEngine, RunningProxy};
use serde_json::{json, Value};

/// In-process stand-in for the proxy engine. Traffic is "routed" by
/// calling [`MemoryEngine::route`].
#[derive(Default)]
pub struct MemoryEngine {
    pub starts: AtomicUsize,
    pub fail_start: bool,
    entries: Arc<Mutex<Vec<Value>>>,
}

impl MemoryEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_start: true,
            ..Default::default()
        })
    }

    pub fn route(&self, method: &str, url: &str) {
        self.entries.lock().unwrap().push(json!({
            "startedDateTime": chrono::Utc::now().to_rfc3339(),
            "request": { "method": method, "url": url, "headers": [] },
            "response": { "status": 200, "headers": [] }
        }));
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

fn har_of(entries: Vec<Value>) -> Har {
    Har::from_value(json!({
        "log": { "version": "1.2", "creator": { "name": "memory" }, "entries": entries }
    }))
}

#[async_trait]
impl ProxyEngine for MemoryEngine {
    async fn start(&self, _port: u16) -> Result<Box<dyn RunningProxy>, EngineError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        if self.fail_start {
            return Err(EngineError::BadStatus(500, "address already in use".into()));
        }
        Ok(Box::new(MemoryProxy {
            entries: Arc::clone(&self.entries),
        }))
    }

    fn host(&self) -> &str {
        "127.0.0.1"
    }
}

struct MemoryProxy {
    entries: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl RunningProxy for MemoryProxy {
    fn port(&self) -> u16 {
        41000
    }

    async fn enable_capture(&self, _types: &[CaptureType]) -> Result<(), EngineError> {
        Ok(())
    }

    async fn har(&self) -> Result<Har, EngineError> {
        Ok(har_of(self.entries.lock().unwrap().clone()))
    }

    async fn new_har(&self) -> Result<Har, EngineError> {
        Ok(har_of(std::mem::take(&mut *self.entries.lock().unwrap())))
    }
}

/// File sink that also remembers every location it handed out.
pub struct CountingSink {
    inner: FileDiagnostics,
    pub touched: Mutex<Vec<PathBuf>>,
}

impl CountingSink {
    pub fn new(base: &std::path::Path) -> Arc<Self> {
        Arc::new(Self {
            inner: FileDiagnostics::new(base).unwrap(),
            touched: Mutex::new(Vec::new()),
        })
    }

    pub fn touch_count(&self) -> usize {
        self.touched.lock().unwrap().len()
    }
}

impl DiagnosticsSink for CountingSink {
    fn touch(&self, unit: &UnitOfWork, name: &str) -> Result<PathBuf, SinkError> {
        let path = self.inner.touch(unit, name)?;
        self.touched.lock().unwrap().push(path.clone());
        Ok(path)
    }
}

/// Sink whose every location is unwritable.
pub struct BrokenSink {
    pub attempts: AtomicUsize,
}

impl BrokenSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attempts: AtomicUsize::new(0),
        })
    }
}

impl DiagnosticsSink for BrokenSink {
    fn touch(&self, _unit: &UnitOfWork, _name: &str) -> Result<PathBuf, SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::CreateFailed(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }
}

/// Sink that hands out locations inside a directory nobody created, so the
/// write after a successful touch fails.
pub struct DanglingSink {
    base: PathBuf,
}

impl DanglingSink {
    pub fn new(base: &std::path::Path) -> Arc<Self> {
        Arc::new(Self {
            base: base.join("never-created"),
        })
    }
}

impl DiagnosticsSink for DanglingSink {
    fn touch(&self, unit: &UnitOfWork, name: &str) -> Result<PathBuf, SinkError> {
        Ok(self.base.join(unit.id.simple().to_string()).join(name))
    }
}

pub fn read_har(path: &std::path::Path) -> Har {
    Har::from_slice(&std::fs::read(path).unwrap()).unwrap()
}
