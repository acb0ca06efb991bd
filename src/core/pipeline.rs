//! Report pipeline: profile loading, per-file matching and aggregation.
//!
//! Each profile is processed independently (locate the source, extract
//! function extents, match them against the blocks) and the per-profile
//! results are reduced afterwards. Results are always reduced in profile
//! order, so the report and the reported error do not depend on
//! `parallel`.

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::config::ReportConfig;
use crate::core::errors::Result;
use crate::detectors::coverage::{
    match_profile, parse_profiles, summarize, Coverage, FunctionInfo, LineTotals, MethodTotals,
    Profile,
};
use crate::io::locator::{GoSourceLocator, SourceResolver};
use crate::io::reports::ReportWriter;
use crate::lang::go::GoFunctionExtractor;

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResults {
    /// Report summary
    pub coverage: Coverage,
    /// Per-function decisions, in profile then declaration order
    pub functions: Vec<FunctionInfo>,
}

/// Partial result for a single profile
#[derive(Debug)]
struct ProfileOutcome {
    lines: LineTotals,
    functions: Vec<FunctionInfo>,
}

/// Matches function declarations against coverage profiles.
pub struct CoveragePipeline<R: SourceResolver> {
    resolver: R,
    parallel: bool,
}

impl<R: SourceResolver> CoveragePipeline<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            parallel: true,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Process every profile and reduce the results into a summary.
    pub fn run(&self, profiles: &[Profile]) -> Result<PipelineResults> {
        let start_time = Instant::now();

        let outcomes: Vec<Result<ProfileOutcome>> = if self.parallel {
            profiles
                .par_iter()
                .map(|profile| self.process_profile(profile))
                .collect()
        } else {
            profiles
                .iter()
                .map(|profile| self.process_profile(profile))
                .collect()
        };

        let mut lines = LineTotals::default();
        let mut functions = Vec::new();
        for outcome in outcomes {
            let outcome = outcome?;
            lines = lines.merge(outcome.lines);
            functions.extend(outcome.functions);
        }

        let methods = MethodTotals::from_functions(&functions);
        let coverage = summarize(lines, methods);

        info!(
            "Matched {} functions across {} files in {:?}",
            functions.len(),
            profiles.len(),
            start_time.elapsed()
        );
        info!(
            "Statements: {} covered, {} missed ({:.1}%)",
            coverage.line_covered,
            coverage.line_missed,
            coverage.line_ratio() * 100.0
        );
        info!(
            "Functions: {} covered, {} missed ({:.1}%)",
            coverage.method_covered,
            coverage.method_missed,
            coverage.method_ratio() * 100.0
        );

        Ok(PipelineResults {
            coverage,
            functions,
        })
    }

    fn process_profile(&self, profile: &Profile) -> Result<ProfileOutcome> {
        let source_path = self.resolver.resolve(profile.file_name())?;

        let mut extractor = GoFunctionExtractor::new()?;
        let extents = extractor.extract_file(&source_path)?;
        let functions = match_profile(&source_path, &extents, profile);

        for info in &functions {
            debug!(
                "{}:{} lines {}-{} covered={} ({} statements)",
                info.file_name().display(),
                info.function_name(),
                info.start_line(),
                info.end_line(),
                info.is_covered(),
                info.covered_statements()
            );
        }

        Ok(ProfileOutcome {
            lines: LineTotals::from_profile(profile),
            functions,
        })
    }
}

/// Run the whole pipeline for `config` and write the report.
///
/// Returns the results together with the path of the written report. Nothing
/// is written when any stage before the writer fails.
pub fn generate_report(config: &ReportConfig) -> Result<(PipelineResults, PathBuf)> {
    config.validate()?;

    info!("Reading coverage profile {}", config.profile_path.display());
    let profiles = parse_profiles(&config.profile_path)?;
    debug!("Loaded {} file profiles", profiles.len());

    let locator = GoSourceLocator::from_config(&config.source);
    let pipeline = CoveragePipeline::new(locator).with_parallel(config.parallel);
    let results = pipeline.run(&profiles)?;

    let writer = ReportWriter::new(config.output_dir.clone(), config.output_file.clone());
    let output_path = writer.write(&results.coverage)?;
    info!("Coverage report written to {}", output_path.display());

    Ok((results, output_path))
}
