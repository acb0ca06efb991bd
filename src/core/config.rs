//! Configuration types for report generation.
//!
//! Values come from three layers: built-in defaults, an optional YAML file,
//! and command-line overrides applied by the binary.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{CoverError, Result};

/// Profile read when no input is configured
pub const DEFAULT_PROFILE_PATH: &str = "coverage.out";

/// Report file name used when none is configured
pub const DEFAULT_OUTPUT_FILE: &str = "coverage.json";

/// Configuration files picked up from the working directory
pub const IMPLICIT_CONFIG_FILES: &[&str] = &[".go-ext-cover.yml", ".go-ext-cover.yaml"];

/// Main configuration for one report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Coverage profile to read
    pub profile_path: PathBuf,

    /// Report file name, joined onto `output_dir`
    pub output_file: String,

    /// Directory for the report (created if absent); current directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Match profiles on the rayon thread pool
    pub parallel: bool,

    /// Source tree lookup settings
    pub source: SourceConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            profile_path: PathBuf::from(DEFAULT_PROFILE_PATH),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            output_dir: None,
            parallel: true,
            source: SourceConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CoverError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.profile_path.as_os_str().is_empty() {
            return Err(CoverError::config_field(
                "Coverage profile path must not be empty",
                "profile_path",
            ));
        }

        if self.output_file.trim().is_empty() {
            return Err(CoverError::config_field(
                "Output file name must not be empty",
                "output_file",
            ));
        }

        if self.output_file.ends_with('/')
            || self.output_file.ends_with(std::path::MAIN_SEPARATOR)
            || Path::new(&self.output_file).file_name().is_none()
        {
            return Err(CoverError::config_field(
                format!("Output file must name a file, got {:?}", self.output_file),
                "output_file",
            ));
        }

        if let Some(dir) = &self.output_dir {
            if dir.as_os_str().is_empty() {
                return Err(CoverError::config_field(
                    "Output directory must not be empty when set",
                    "output_dir",
                ));
            }
        }

        self.source.validate()
    }
}

/// Where profile file names are looked up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding `go.mod`
    pub module_root: PathBuf,

    /// GOPATH entries; read from the environment when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gopath: Option<Vec<PathBuf>>,

    /// GOROOT; read from the environment when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goroot: Option<PathBuf>,

    /// Module download cache; `$GOMODCACHE` or `<first GOPATH>/pkg/mod` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_cache: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            module_root: PathBuf::from("."),
            gopath: None,
            goroot: None,
            module_cache: None,
        }
    }
}

impl SourceConfig {
    /// Configured GOPATH, else `$GOPATH`, else `$HOME/go`.
    pub fn effective_gopath(&self) -> Vec<PathBuf> {
        if let Some(gopath) = &self.gopath {
            return gopath.clone();
        }

        let from_env: Vec<PathBuf> = env::var_os("GOPATH")
            .map(|value| {
                env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if !from_env.is_empty() {
            return from_env;
        }

        dirs::home_dir()
            .map(|home| vec![home.join("go")])
            .unwrap_or_default()
    }

    /// Configured GOROOT, else `$GOROOT`.
    pub fn effective_goroot(&self) -> Option<PathBuf> {
        self.goroot.clone().or_else(|| {
            env::var_os("GOROOT")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }

    /// Configured module cache, else `$GOMODCACHE`, else `<first GOPATH>/pkg/mod`.
    pub fn effective_module_cache(&self) -> Option<PathBuf> {
        self.module_cache
            .clone()
            .or_else(|| {
                env::var_os("GOMODCACHE")
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| {
                self.effective_gopath()
                    .into_iter()
                    .next()
                    .map(|gopath| gopath.join("pkg").join("mod"))
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.module_root.as_os_str().is_empty() {
            return Err(CoverError::config_field(
                "Module root must not be empty",
                "source.module_root",
            ));
        }
        Ok(())
    }
}
