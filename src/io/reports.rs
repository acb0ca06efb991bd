//! Coverage report writer.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::core::errors::{CoverError, Result};
use crate::detectors::coverage::types::Coverage;

/// Writes the JSON summary to `<output_dir>/<output_file>`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: Option<PathBuf>,
    output_file: String,
}

impl ReportWriter {
    pub fn new(output_dir: Option<PathBuf>, output_file: impl Into<String>) -> Self {
        Self {
            output_dir,
            output_file: output_file.into(),
        }
    }

    /// Destination path of the report
    pub fn output_path(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(&self.output_file),
            None => PathBuf::from(&self.output_file),
        }
    }

    /// Serialize `coverage` and write it, creating the directory if needed.
    ///
    /// The JSON uses two-space indentation and has no trailing newline.
    pub fn write(&self, coverage: &Coverage) -> Result<PathBuf> {
        let output_path = self.output_path();

        if let Some(dir) = &self.output_dir {
            fs::create_dir_all(dir).map_err(|err| CoverError::output_write(dir, err))?;
        }

        let content = serde_json::to_string_pretty(coverage)?;
        fs::write(&output_path, &content)
            .map_err(|err| CoverError::output_write(&output_path, err))?;

        debug!("Wrote {} bytes to {}", content.len(), output_path.display());
        Ok(output_path)
    }
}
