//! Error types for the go-ext-cover library.
//!
//! Every stage of the report pipeline fails through [`CoverError`]. No
//! variant is handled inside the library; all of them propagate to the
//! caller and no partial report is written.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main result type for go-ext-cover operations.
pub type Result<T> = std::result::Result<T, CoverError>;

/// Error type for all go-ext-cover operations.
#[derive(Error, Debug)]
pub enum CoverError {
    /// Malformed coverage profile input
    #[error("Invalid coverage profile {}{}: {message}", .path.display(), format_location(.line, &None))]
    ProfileParse {
        /// Profile being read
        path: PathBuf,
        /// 1-based line in the profile (if available)
        line: Option<usize>,
        /// Error description
        message: String,
    },

    /// A file named by the profile could not be found in the source tree
    #[error("Can't find {file_name:?}: tried {}", format_candidates(.candidates))]
    SourceResolution {
        /// File identifier as written in the profile
        file_name: String,
        /// Every path that was checked
        candidates: Vec<PathBuf>,
    },

    /// A located source file is not valid Go
    #[error("Parse error in {}{}: {message}", .file_path.display(), format_location(.line, .column))]
    SourceParse {
        /// Source file being parsed
        file_path: PathBuf,
        /// Error description
        message: String,
        /// Line number (if available)
        line: Option<usize>,
        /// Column number (if available)
        column: Option<usize>,
    },

    /// The report destination could not be created or written
    #[error("Failed to write report to {}: {source}", .path.display())]
    OutputWrite {
        /// Directory or file that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Other I/O errors (reading profiles, sources, configuration)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Underlying serialization error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    if candidates.is_empty() {
        return "no candidate paths".to_string();
    }
    candidates
        .iter()
        .map(|c| c.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(":{line}:{column}"),
        (Some(line), None) => format!(":{line}"),
        _ => String::new(),
    }
}

impl CoverError {
    /// Create a new profile parse error
    pub fn profile_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ProfileParse {
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }

    /// Create a new profile parse error pointing at a profile line
    pub fn profile_parse_at(
        path: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::ProfileParse {
            path: path.into(),
            line: Some(line),
            message: message.into(),
        }
    }

    /// Create a new source resolution error
    pub fn source_resolution(file_name: impl Into<String>, candidates: Vec<PathBuf>) -> Self {
        Self::SourceResolution {
            file_name: file_name.into(),
            candidates,
        }
    }

    /// Create a new source parse error
    pub fn source_parse(file_path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SourceParse {
            file_path: file_path.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a new source parse error with a location
    pub fn source_parse_with_location(
        file_path: impl Into<PathBuf>,
        message: impl Into<String>,
        line: Option<usize>,
        column: Option<usize>,
    ) -> Self {
        Self::SourceParse {
            file_path: file_path.into(),
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a new output write error
    pub fn output_write(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::OutputWrite {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: field.into(),
        }
    }
}

impl From<serde_json::Error> for CoverError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            source: Box::new(err),
        }
    }
}

impl From<serde_yaml::Error> for CoverError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            source: Box::new(err),
        }
    }
}
