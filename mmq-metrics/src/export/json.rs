//! JSON export for run results

use crate::error::MetricsError;
use crate::export::{ExportBundle, RunExporter};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// JSON exporter for run results
#[derive(Debug)]
pub struct JsonExporter {
    path: PathBuf,
    pretty: bool,
}

impl JsonExporter {
    /// Create a new JSON exporter
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn new(path: &Path, pretty: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            pretty,
        }
    }
}

impl RunExporter for JsonExporter {
    fn export(&self, bundle: &ExportBundle<'_>) -> Result<(), MetricsError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(bundle)
        } else {
            serde_json::to_string(bundle)
        }?;

        let mut file = File::create(&self.path)
            .map_err(|e| MetricsError::ExportError(format!("Failed to create {}: {e}", self.path.display())))?;
        file.write_all(json.as_bytes())?;

        tracing::debug!(path = %self.path.display(), records = bundle.records.len(), "Exported run as JSON");
        Ok(())
    }
}
