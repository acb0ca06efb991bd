//! Function-to-block coverage matching.
//!
//! A function is covered when any executed block overlaps its lexical span.
//! Overlap is decided on [`SourcePosition`] ordering, so two regions on the
//! same line are told apart by their byte columns. A block that merely
//! touches a function boundary (ends exactly where the function starts, or
//! starts exactly where it ends) does not belong to it. Matching is by
//! overlap rather than partition: one block may be credited to several
//! functions.

use std::path::Path;

use tracing::trace;

use crate::detectors::coverage::types::{Block, FunctionExtent, FunctionInfo, Profile};

/// Sum the statements of executed blocks overlapping `extent`.
///
/// `blocks` must be in ascending start order: the scan stops at the first
/// block starting at or after the function's end. An unsorted slice is not
/// rejected, it silently undercounts. [`Profile`] always satisfies the order.
pub fn covered_statements(extent: &FunctionExtent, blocks: &[Block]) -> u64 {
    let mut covered = 0u64;
    for block in blocks {
        if block.start >= extent.end {
            break;
        }
        if block.end <= extent.start {
            continue;
        }
        if block.is_executed() {
            covered = covered.saturating_add(block.statement_count);
        }
    }
    covered
}

/// Decide coverage for one function against its own file's profile.
pub fn match_function(
    file_path: &Path,
    extent: &FunctionExtent,
    profile: &Profile,
) -> FunctionInfo {
    let covered = covered_statements(extent, profile.blocks());
    trace!(
        "{}:{} [{} - {}] covered statements: {}",
        file_path.display(),
        extent.name,
        extent.start,
        extent.end,
        covered
    );
    FunctionInfo::new(file_path, extent, covered)
}

/// Match every extent of one file, preserving declaration order.
pub fn match_profile(
    file_path: &Path,
    extents: &[FunctionExtent],
    profile: &Profile,
) -> Vec<FunctionInfo> {
    extents
        .iter()
        .map(|extent| match_function(file_path, extent, profile))
        .collect()
}
