use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    InvalidEngineUrl(String),
    InvalidArtifactName(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidEngineUrl(e) => write!(f, "Invalid engine URL: {}", e),
            ConfigError::InvalidArtifactName(e) => write!(f, "Invalid artifact name: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures reported by a proxy engine collaborator.
#[derive(Debug)]
pub enum EngineError {
    RequestFailed(String),
    BadStatus(u16, String),
    BadResponse(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::RequestFailed(e) => write!(f, "Engine request failed: {}", e),
            EngineError::BadStatus(code, e) => write!(f, "Engine returned status {}: {}", code, e),
            EngineError::BadResponse(e) => write!(f, "Engine response malformed: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::RequestFailed(err.to_string())
    }
}

/// The proxy could not be brought up. Latched for the rest of the process.
#[derive(Debug)]
pub enum ProxyStartupError {
    /// The engine failed on this very acquisition.
    EngineFailed(EngineError),
    /// An earlier acquisition already failed; the engine is not retried.
    Unavailable(String),
}

impl fmt::Display for ProxyStartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyStartupError::EngineFailed(e) => write!(f, "Capture proxy failed to start: {}", e),
            ProxyStartupError::Unavailable(e) => {
                write!(f, "Capture proxy unavailable after earlier startup failure: {}", e)
            }
        }
    }
}

impl std::error::Error for ProxyStartupError {}

#[derive(Debug)]
pub enum SinkError {
    InvalidName(String),
    CreateFailed(std::io::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::InvalidName(e) => write!(f, "Invalid artifact name: {}", e),
            SinkError::CreateFailed(e) => write!(f, "Diagnostics location creation failed: {}", e),
        }
    }
}

impl std::error::Error for SinkError {}

/// Anything that kept an artifact from reaching disk. Never escapes the recorder.
#[derive(Debug)]
pub enum ArtifactWriteError {
    SinkFailed(SinkError),
    SnapshotFailed(EngineError),
    IoError(std::io::Error),
    SerializeError(serde_json::Error),
}

impl fmt::Display for ArtifactWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactWriteError::SinkFailed(e) => write!(f, "Diagnostics sink error: {}", e),
            ArtifactWriteError::SnapshotFailed(e) => write!(f, "Capture snapshot error: {}", e),
            ArtifactWriteError::IoError(e) => write!(f, "Artifact IO error: {}", e),
            ArtifactWriteError::SerializeError(e) => write!(f, "Artifact serialization error: {}", e),
        }
    }
}

impl std::error::Error for ArtifactWriteError {}

impl From<std::io::Error> for ArtifactWriteError {
    fn from(err: std::io::Error) -> Self {
        ArtifactWriteError::IoError(err)
    }
}

impl From<serde_json::Error> for ArtifactWriteError {
    fn from(err: serde_json::Error) -> Self {
        ArtifactWriteError::SerializeError(err)
    }
}

#[derive(Debug)]
pub enum RunError {
    ConfigurationError(ConfigError),
    ProxyStartup(ProxyStartupError),
    SinkError(SinkError),
    SpawnFailed(std::io::Error),
    CommandFailed(Option<i32>),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            RunError::ProxyStartup(e) => write!(f, "Proxy startup error: {}", e),
            RunError::SinkError(e) => write!(f, "Diagnostics error: {}", e),
            RunError::SpawnFailed(e) => write!(f, "Failed to spawn command: {}", e),
            RunError::CommandFailed(Some(code)) => write!(f, "Command exited with status {}", code),
            RunError::CommandFailed(None) => write!(f, "Command terminated by signal"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ConfigError> for RunError {
    fn from(err: ConfigError) -> Self {
        RunError::ConfigurationError(err)
    }
}

impl From<ProxyStartupError> for RunError {
    fn from(err: ProxyStartupError) -> Self {
        RunError::ProxyStartup(err)
    }
}
