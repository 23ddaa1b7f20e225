//! HTTP archive document as exported by the proxy engine.
//!
//! The document is kept exactly as the engine produced it and written back
//! out verbatim; nothing here interprets the recorded traffic.

use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Har {
    document: Value,
}

impl Har {
    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            document: serde_json::from_slice(bytes)?,
        })
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Number of entries under `log.entries`, 0 when the document has none.
    pub fn entry_count(&self) -> usize {
        self.document
            .pointer("/log/entries")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Serializes the document to `path`, replacing whatever is there.
    ///
    /// The document goes to a temporary file next to `path` that is renamed
    /// over it once complete, so `path` never holds a partial archive.
    pub fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &self.document)?;
            writer.flush()?;
        }
        file.persist(path).map_err(|e| e.error)?;
        debug!("Wrote HAR with {} entries to {}", self.entry_count(), path.display());
        Ok(())
    }
}
