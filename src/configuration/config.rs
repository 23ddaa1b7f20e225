use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use reqwest::Url;

use super::types::Settings;
use crate::diagnostics::file_diagnostics::is_bare_file_name;
use crate::error_handling::types::ConfigError;
use crate::proxy::SnapshotMode;
use crate::recording_policy::RecordingPolicy;

/// Process-wide configuration, resolved once at startup and passed by
/// reference afterwards.
///
/// # Fields Overview
///
/// - `policy`: the recording policy; never re-read for the rest of the run
/// - `engine_url`: where the BrowserMob Proxy REST server listens
/// - `diagnostics_dir`: base directory for per-unit artifacts
/// - `artifact_name`: file name of the HAR inside a unit's directory
/// - `snapshot_mode`: cumulative (default) or per-unit archives
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub policy: RecordingPolicy,
    pub engine_url: Url,
    pub diagnostics_dir: PathBuf,
    pub artifact_name: String,
    pub snapshot_mode: SnapshotMode,
}

impl Config {
    /// Validates `settings` and resolves the recording policy.
    pub fn resolve(settings: Settings) -> Result<Self, ConfigError> {
        let policy = match settings.record_browser_traffic.as_deref() {
            Some(token) => RecordingPolicy::from_token(token),
            None => RecordingPolicy::from_env(),
        };

        let engine_url = Url::parse(&settings.engine_url).map_err(|e| {
            ConfigError::InvalidEngineUrl(format!("{}: {}", settings.engine_url, e))
        })?;
        if engine_url.host_str().is_none() {
            return Err(ConfigError::InvalidEngineUrl(format!(
                "{} has no host",
                settings.engine_url
            )));
        }

        if !is_bare_file_name(&settings.artifact_name) {
            return Err(ConfigError::InvalidArtifactName(settings.artifact_name));
        }

        let config = Self {
            policy,
            engine_url,
            diagnostics_dir: settings.diagnostics_dir,
            artifact_name: settings.artifact_name,
            snapshot_mode: settings.snapshot_mode,
        };
        info!(
            "Recording policy: {} (snapshot mode {:?})",
            config.policy, config.snapshot_mode
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        debug!("Parsed settings: {:?}", settings);
        Self::resolve(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording_policy::POLICY_ENV_VAR;
    use clap::Parser;
    use serial_test::serial;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    #[serial]
    fn test_from_args() {
        std::env::remove_var(POLICY_ENV_VAR);
        let cli = Cli::try_parse_from([
            "harcap",
            "--record-browser-traffic",
            "always",
            "--engine-url",
            "http://bmp:9090",
            "--diagnostics-dir",
            "/tmp/diag",
            "--snapshot-mode",
            "per-unit",
        ])
        .unwrap_or_else(|e| panic!("{}", e));

        let config = Config::resolve(cli.settings).unwrap();
        assert_eq!(config.policy, RecordingPolicy::Always);
        assert_eq!(config.engine_url.host_str(), Some("bmp"));
        assert_eq!(config.diagnostics_dir, PathBuf::from("/tmp/diag"));
        assert_eq!(config.artifact_name, "traffic.har");
        assert_eq!(config.snapshot_mode, SnapshotMode::PerUnit);
    }

    #[test]
    #[serial]
    fn test_args_default_to_failures_only() {
        std::env::remove_var(POLICY_ENV_VAR);
        let cli = Cli::try_parse_from(["harcap"]).unwrap();
        let config = Config::resolve(cli.settings).unwrap();
        assert_eq!(config.policy, RecordingPolicy::FailuresOnly);
        assert_eq!(config.snapshot_mode, SnapshotMode::Cumulative);
    }

    #[test]
    #[serial]
    fn test_toml_missing_policy_reads_env() {
        std::env::set_var(POLICY_ENV_VAR, "off");
        let config = Config::from_toml_str("engine_url = \"http://localhost:8080\"\n").unwrap();
        std::env::remove_var(POLICY_ENV_VAR);
        assert_eq!(config.policy, RecordingPolicy::Off);
    }

    #[test]
    #[serial]
    fn test_toml_policy_wins_over_env() {
        std::env::set_var(POLICY_ENV_VAR, "off");
        let config = Config::from_toml_str("record_browser_traffic = \"always\"\n").unwrap();
        std::env::remove_var(POLICY_ENV_VAR);
        assert_eq!(config.policy, RecordingPolicy::Always);
    }

    #[test]
    fn test_toml_unknown_policy_is_failures_only() {
        let config = Config::from_toml_str("record_browser_traffic = \"sometimes\"\n").unwrap();
        assert_eq!(config.policy, RecordingPolicy::FailuresOnly);
    }

    #[test]
    fn test_rejects_bad_engine_url() {
        let err = Config::from_toml_str("engine_url = \"localhost\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEngineUrl(_)));
    }

    #[test]
    fn test_rejects_nested_artifact_name() {
        let err = Config::from_toml_str("artifact_name = \"../x.har\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArtifactName(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Config::from_toml_str("engine_url = ").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harcap.toml");
        fs::write(
            &path,
            "record_browser_traffic = \"always\"\nartifact_name = \"jenkins.har\"\nsnapshot_mode = \"per-unit\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.policy, RecordingPolicy::Always);
        assert_eq!(config.artifact_name, "jenkins.har");
        assert_eq!(config.snapshot_mode, SnapshotMode::PerUnit);

        assert!(matches!(
            Config::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::IoError(_))
        ));
    }
}
