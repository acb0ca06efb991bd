//! Command execution for the report run.

use anyhow::Context;
use tracing::info;

use crate::cli::args::Cli;
use crate::cli::config_layer::build_layered_config;
use go_ext_cover::core::pipeline::generate_report;

/// Load configuration, run the pipeline and write the report.
pub fn run(args: &Cli) -> anyhow::Result<()> {
    let config = build_layered_config(args)?;

    let (results, output_path) = generate_report(&config).with_context(|| {
        format!(
            "Failed to generate coverage report from {}",
            config.profile_path.display()
        )
    })?;

    info!(
        "{} of {} functions covered ({})",
        results.coverage.method_covered,
        results.coverage.method_total(),
        output_path.display()
    );
    Ok(())
}
