use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;

use crate::proxy::SnapshotMode;
use crate::recorder::DEFAULT_ARTIFACT_NAME;
use crate::recording_policy::POLICY_ENV_VAR;

pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_DIAGNOSTICS_DIR: &str = "diagnostics";

/// Raw, unvalidated settings as they come from the command line or a TOML
/// file. Turned into a [`Config`](super::Config) exactly once.
#[derive(Args, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Recording policy: `off`, `failuresOnly` or `always`
    ///
    /// Unknown values mean `failuresOnly`. When absent from a TOML file the
    /// `RECORD_BROWSER_TRAFFIC` environment variable is consulted.
    #[arg(long, env = POLICY_ENV_VAR)]
    pub record_browser_traffic: Option<String>,

    /// Base URL of the BrowserMob Proxy REST server
    #[arg(long, env = "HARCAP_ENGINE_URL", default_value = DEFAULT_ENGINE_URL)]
    pub engine_url: String,

    /// Directory receiving one sub-directory of artifacts per unit of work
    #[arg(long, env = "HARCAP_DIAGNOSTICS_DIR", default_value = DEFAULT_DIAGNOSTICS_DIR)]
    pub diagnostics_dir: PathBuf,

    /// File name of the HAR artifact inside a unit's directory
    #[arg(long, default_value = DEFAULT_ARTIFACT_NAME)]
    pub artifact_name: String,

    /// `cumulative` keeps all traffic since proxy start in every artifact;
    /// `per-unit` resets the archive after each snapshot
    #[arg(long, value_enum, default_value_t = SnapshotMode::Cumulative)]
    pub snapshot_mode: SnapshotMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            record_browser_traffic: None,
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            diagnostics_dir: PathBuf::from(DEFAULT_DIAGNOSTICS_DIR),
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            snapshot_mode: SnapshotMode::Cumulative,
        }
    }
}
