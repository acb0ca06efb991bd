//! Reduction of blocks and function decisions into the [`Coverage`] summary.
//!
//! Totals are plain mergeable values so per-profile partial results can be
//! combined in any grouping; the pipeline relies on this to aggregate
//! parallel workers without shared state.

use crate::detectors::coverage::types::{Block, Coverage, FunctionInfo, Profile};

/// Statement totals split by execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineTotals {
    pub covered: u64,
    pub missed: u64,
}

impl LineTotals {
    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Self {
        blocks.into_iter().fold(Self::default(), |mut totals, block| {
            if block.is_executed() {
                totals.covered = totals.covered.saturating_add(block.statement_count);
            } else {
                totals.missed = totals.missed.saturating_add(block.statement_count);
            }
            totals
        })
    }

    pub fn from_profile(profile: &Profile) -> Self {
        Self::from_blocks(profile.blocks())
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            covered: self.covered.saturating_add(other.covered),
            missed: self.missed.saturating_add(other.missed),
        }
    }

    pub fn total(&self) -> u64 {
        self.covered.saturating_add(self.missed)
    }
}

/// Function counts split by coverage decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodTotals {
    pub covered: u64,
    pub missed: u64,
}

impl MethodTotals {
    pub fn from_functions<'a>(functions: impl IntoIterator<Item = &'a FunctionInfo>) -> Self {
        functions
            .into_iter()
            .fold(Self::default(), |mut totals, info| {
                if info.is_covered() {
                    totals.covered += 1;
                } else {
                    totals.missed += 1;
                }
                totals
            })
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            covered: self.covered.saturating_add(other.covered),
            missed: self.missed.saturating_add(other.missed),
        }
    }

    pub fn total(&self) -> u64 {
        self.covered.saturating_add(self.missed)
    }
}

/// Line totals across every profile, independent of function matching.
pub fn line_totals(profiles: &[Profile]) -> LineTotals {
    profiles
        .iter()
        .map(LineTotals::from_profile)
        .fold(LineTotals::default(), LineTotals::merge)
}

/// Build the summary from already reduced totals.
pub fn summarize(lines: LineTotals, methods: MethodTotals) -> Coverage {
    Coverage {
        line_missed: lines.missed,
        line_covered: lines.covered,
        method_missed: methods.missed,
        method_covered: methods.covered,
    }
}

/// Aggregate all profiles and all function decisions in one pass.
pub fn aggregate(profiles: &[Profile], functions: &[FunctionInfo]) -> Coverage {
    summarize(line_totals(profiles), MethodTotals::from_functions(functions))
}
