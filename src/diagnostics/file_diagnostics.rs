use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, error, info};
use regex::Regex;

use crate::error_handling::types::SinkError;
use crate::lifecycle::UnitOfWork;

use super::sink::DiagnosticsSink;

/// Env var overriding the base directory used by [`FileDiagnostics::new_default`].
pub const DIAGNOSTICS_DIR_ENV: &str = "HARCAP_DIAGNOSTICS_DIR";

/// File-system sink: `base_path/<unit label>-<unit id>/<artifact name>`.
pub struct FileDiagnostics {
    base_path: PathBuf,
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex"))
}

/// Turns a unit label into a single safe path component.
pub fn sanitize_label(label: &str) -> String {
    let cleaned = unsafe_chars().replace_all(label.trim(), "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}

/// True when `name` is a plain file name with no directory parts.
pub fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

impl FileDiagnostics {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, SinkError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| {
            error!("Failed to create diagnostics dir {}: {}", base_path.display(), e);
            SinkError::CreateFailed(e)
        })?;
        info!("FileDiagnostics initialized at {}", base_path.display());
        Ok(Self { base_path })
    }

    /// Uses `HARCAP_DIAGNOSTICS_DIR` if set, otherwise `./diagnostics`.
    pub fn new_default() -> Result<Self, SinkError> {
        if let Ok(dir) = std::env::var(DIAGNOSTICS_DIR_ENV) {
            info!("Using diagnostics dir from {}: {}", DIAGNOSTICS_DIR_ENV, dir);
            return Self::new(PathBuf::from(dir));
        }
        Self::new("diagnostics")
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// One directory per unit. The id keeps units with equal (or equally
    /// sanitized) labels apart.
    pub fn unit_dir(&self, unit: &UnitOfWork) -> PathBuf {
        self.base_path
            .join(format!("{}-{}", sanitize_label(&unit.label), unit.id.simple()))
    }
}

impl DiagnosticsSink for FileDiagnostics {
    fn touch(&self, unit: &UnitOfWork, name: &str) -> Result<PathBuf, SinkError> {
        if !is_bare_file_name(name) {
            return Err(SinkError::InvalidName(name.to_string()));
        }
        let dir = self.unit_dir(unit);
        fs::create_dir_all(&dir).map_err(|e| {
            error!("[{}] Failed to create {}: {}", unit.label, dir.display(), e);
            SinkError::CreateFailed(e)
        })?;
        let path = dir.join(name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                error!("[{}] Failed to touch {}: {}", unit.label, path.display(), e);
                SinkError::CreateFailed(e)
            })?;
        debug!("[{}] Diagnostics file ready at {}", unit.label, path.display());
        Ok(path)
    }
}
