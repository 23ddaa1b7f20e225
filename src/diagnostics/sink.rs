use std::path::PathBuf;

use crate::error_handling::types::SinkError;
use crate::lifecycle::UnitOfWork;

pub trait DiagnosticsSink: Send + Sync {
    /// Returns a created, writable file for artifact `name` of `unit`.
    ///
    /// `name` is a bare file name such as `traffic.har`.
    fn touch(&self, unit: &UnitOfWork, name: &str) -> Result<PathBuf, SinkError>;
}
