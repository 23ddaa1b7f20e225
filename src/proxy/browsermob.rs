//! Adapter for a BrowserMob Proxy REST server.
//!
//! The server runs as its own process; this module only drives it:
//!
//! - `POST /proxy` starts a proxy and answers `{"port": N}`
//! - `PUT /proxy/{port}/har` starts a new archive with the given capture
//!   flags and answers the previous archive (or 204 when there was none)
//! - `GET /proxy/{port}/har` exports the current archive
//!
//! ```no_run
//! use std::sync::Arc;
//! use harcap::proxy::{BrowserMobEngine, CaptureProxy};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = BrowserMobEngine::new("http://127.0.0.1:8080")?;
//! let proxy = CaptureProxy::new(Arc::new(engine));
//! let running = proxy.acquire().await?;
//! println!("route clients through port {}", running.port());
//! # Ok(())
//! # }
//! ```

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use crate::error_handling::types::{ConfigError, EngineError};
use crate::har::Har;

use super::engine::{ProxyEngine, RunningProxy};
use super::types::CaptureType;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ProxyCreated {
    port: u16,
}

pub struct BrowserMobEngine {
    client: Client,
    base_url: Url,
    host: String,
}

impl BrowserMobEngine {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidEngineUrl(format!("{}: {}", base_url, e)))?;
        // `join` replaces the last segment unless the path ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let host = base_url
            .host_str()
            .ok_or_else(|| ConfigError::InvalidEngineUrl(format!("{} has no host", base_url)))?
            .to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::InvalidEngineUrl(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            host,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, EngineError> {
        self.base_url
            .join(path)
            .map_err(|e| EngineError::BadResponse(format!("bad endpoint {}: {}", path, e)))
    }
}

#[async_trait]
impl ProxyEngine for BrowserMobEngine {
    async fn start(&self, port: u16) -> Result<Box<dyn RunningProxy>, EngineError> {
        let mut request = self.client.post(self.endpoint("proxy")?);
        if port != 0 {
            request = request.query(&[("port", port)]);
        }
        let response = expect_success(request.send().await?).await?;
        let created: ProxyCreated = response
            .json()
            .await
            .map_err(|e| EngineError::BadResponse(e.to_string()))?;
        debug!("BrowserMob proxy created on port {}", created.port);

        Ok(Box::new(BrowserMobProxy {
            client: self.client.clone(),
            har_url: self.endpoint(&format!("proxy/{}/har", created.port))?,
            port: created.port,
            capture: Mutex::new(Vec::new()),
        }))
    }

    fn host(&self) -> &str {
        &self.host
    }
}

struct BrowserMobProxy {
    client: Client,
    har_url: Url,
    port: u16,
    capture: Mutex<Vec<CaptureType>>,
}

impl BrowserMobProxy {
    fn capture_flags(&self) -> [(&'static str, bool); 2] {
        let capture = self.capture.lock().unwrap_or_else(|e| e.into_inner());
        let headers = capture.iter().any(|t| {
            matches!(t, CaptureType::RequestHeaders | CaptureType::ResponseHeaders)
        });
        let content = capture.iter().any(|t| {
            matches!(t, CaptureType::RequestContent | CaptureType::ResponseContent)
        });
        [("captureHeaders", headers), ("captureContent", content)]
    }

    async fn put_new_har(&self) -> Result<Option<Har>, EngineError> {
        let response = self
            .client
            .put(self.har_url.clone())
            .query(&self.capture_flags())
            .send()
            .await?;
        let response = expect_success(response).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Har::from_slice(&bytes)
            .map(Some)
            .map_err(|e| EngineError::BadResponse(e.to_string()))
    }
}

#[async_trait]
impl RunningProxy for BrowserMobProxy {
    fn port(&self) -> u16 {
        self.port
    }

    async fn enable_capture(&self, types: &[CaptureType]) -> Result<(), EngineError> {
        {
            let mut capture = self.capture.lock().unwrap_or_else(|e| e.into_inner());
            for t in types {
                if !capture.contains(t) {
                    capture.push(*t);
                }
            }
        }
        self.put_new_har().await?;
        debug!("[{}] HAR capture enabled: {:?}", self.port, types);
        Ok(())
    }

    async fn har(&self) -> Result<Har, EngineError> {
        let response = self.client.get(self.har_url.clone()).send().await?;
        let bytes = expect_success(response).await?.bytes().await?;
        trace!("[{}] exported {} byte HAR", self.port, bytes.len());
        Har::from_slice(&bytes).map_err(|e| EngineError::BadResponse(e.to_string()))
    }

    async fn new_har(&self) -> Result<Har, EngineError> {
        Ok(self
            .put_new_har()
            .await?
            .unwrap_or_else(|| Har::from_value(json!({ "log": { "version": "1.2", "entries": [] } }))))
    }
}

async fn expect_success(response: Response) -> Result<Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(EngineError::BadStatus(status.as_u16(), body))
    }
}
