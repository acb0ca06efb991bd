//! Configuration Layer Management
//!
//! Defaults, then the YAML file (explicit `--config` or an implicit
//! `.go-ext-cover.yml`), then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::cli::args::Cli;
use go_ext_cover::core::config::{ReportConfig, IMPLICIT_CONFIG_FILES};

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another configuration into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

/// Convert CLI arguments to partial configuration overrides
pub trait FromCliArgs<T> {
    /// Create a partial configuration from CLI arguments
    fn from_cli_args(args: &T) -> Self;
}

/// Values explicitly set on the command line
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliOverrides {
    pub profile_path: Option<PathBuf>,
    pub output_file: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub module_root: Option<PathBuf>,
}

impl FromCliArgs<Cli> for CliOverrides {
    fn from_cli_args(args: &Cli) -> Self {
        Self {
            profile_path: args.file.clone(),
            output_file: args.output_file.clone(),
            output_dir: args.output_dir.clone(),
            module_root: args.module_root.clone(),
        }
    }
}

impl ConfigMerge<CliOverrides> for ReportConfig {
    fn merge_with(&mut self, other: CliOverrides) {
        if let Some(profile_path) = other.profile_path {
            self.profile_path = profile_path;
        }
        if let Some(output_file) = other.output_file {
            self.output_file = output_file;
        }
        if let Some(output_dir) = other.output_dir {
            self.output_dir = Some(output_dir);
        }
        if let Some(module_root) = other.module_root {
            self.source.module_root = module_root;
        }
    }
}

/// First implicit config file present in `dir`
pub fn find_implicit_config(dir: &Path) -> Option<PathBuf> {
    IMPLICIT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Build the effective configuration for a run.
pub fn build_layered_config(args: &Cli) -> anyhow::Result<ReportConfig> {
    build_layered_config_in(args, Path::new("."))
}

fn build_layered_config_in(args: &Cli, working_dir: &Path) -> anyhow::Result<ReportConfig> {
    // Prefer an explicit --config, otherwise look for local defaults
    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => find_implicit_config(working_dir),
    };

    let mut config = match &config_path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            ReportConfig::from_yaml_file(path).with_context(|| {
                format!("Failed to load configuration from {}", path.display())
            })?
        }
        None => ReportConfig::default(),
    };

    config.merge_with(CliOverrides::from_cli_args(args));

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}
