//! File-backed row store

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::RowStore;
use crate::data::{self, Row};
use crate::error::{RendezvousError, Result};

/// Row store reading and writing a comma-separated text file
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    /// Create a store over `path`. The file is not touched until used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RowStore for CsvFileStore {
    fn load(&self) -> Result<Vec<Row>> {
        let text = fs::read_to_string(&self.path).map_err(|e| RendezvousError::SourceUnavailable {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let rows = data::decode(&text)?;
        debug!("Loaded {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn save(&self, rows: &[Row]) -> Result<()> {
        fs::write(&self.path, data::encode(rows)).map_err(|e| RendezvousError::SinkUnavailable {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!("Saved {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}
