use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A 1-based (line, byte column) location in a source file.
///
/// Ordering is lexicographic, line first, which is the order both the
/// profile format and the syntax tree use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.column)
    }
}

/// Profile counter mode declared on the `mode:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverMode {
    Set,
    Count,
    Atomic,
}

impl CoverMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CoverMode::Set => "set",
            CoverMode::Count => "count",
            CoverMode::Atomic => "atomic",
        }
    }

    /// Combine two samples taken at the same block.
    pub fn merge_counts(self, existing: u64, incoming: u64) -> u64 {
        match self {
            CoverMode::Set => existing | incoming,
            CoverMode::Count | CoverMode::Atomic => existing.saturating_add(incoming),
        }
    }
}

impl FromStr for CoverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "set" => Ok(CoverMode::Set),
            "count" => Ok(CoverMode::Count),
            "atomic" => Ok(CoverMode::Atomic),
            other => Err(format!("unknown coverage mode {other:?}")),
        }
    }
}

impl fmt::Display for CoverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A profiled statement region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub start: SourcePosition,
    pub end: SourcePosition,
    pub statement_count: u64,
    pub execution_count: u64,
}

impl Block {
    pub fn new(
        start: SourcePosition,
        end: SourcePosition,
        statement_count: u64,
        execution_count: u64,
    ) -> Self {
        Self {
            start,
            end,
            statement_count,
            execution_count,
        }
    }

    /// Whether the block ran at least once during the profiled run
    pub fn is_executed(&self) -> bool {
        self.execution_count > 0
    }

    fn same_span(&self, other: &Block) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// Coverage record for one source file.
///
/// Blocks are always held in ascending start order; the constructor sorts
/// them, so the matcher's early exit is sound for every `Profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    file_name: String,
    mode: CoverMode,
    blocks: Vec<Block>,
}

impl Profile {
    pub fn new(file_name: impl Into<String>, mode: CoverMode, mut blocks: Vec<Block>) -> Self {
        blocks.sort_by_key(|block| block.start);
        Self {
            file_name: file_name.into(),
            mode,
            blocks,
        }
    }

    /// File identifier exactly as written in the profile
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mode(&self) -> CoverMode {
        self.mode
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Merge adjacent samples of the same block according to the mode.
    ///
    /// Returns the conflicting pair of statement counts when two samples of
    /// one block disagree.
    pub(crate) fn merge_duplicate_blocks(&mut self) -> Result<(), (u64, u64)> {
        let mode = self.mode;
        let mut merged: Vec<Block> = Vec::with_capacity(self.blocks.len());
        for block in self.blocks.drain(..) {
            match merged.last_mut() {
                Some(last) if last.same_span(&block) => {
                    if last.statement_count != block.statement_count {
                        return Err((last.statement_count, block.statement_count));
                    }
                    last.execution_count =
                        mode.merge_counts(last.execution_count, block.execution_count);
                }
                _ => merged.push(block),
            }
        }
        self.blocks = merged;
        Ok(())
    }
}

/// Lexical span of one function or method declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionExtent {
    pub name: String,
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl FunctionExtent {
    pub fn new(name: impl Into<String>, start: SourcePosition, end: SourcePosition) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }
}

/// Per-function coverage decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInfo {
    file_name: PathBuf,
    function_name: String,
    start_line: usize,
    end_line: usize,
    covered_statements: u64,
    is_covered: bool,
}

impl FunctionInfo {
    /// Build the record for `extent`; coverage is derived from the matched count.
    pub fn new(
        file_name: impl Into<PathBuf>,
        extent: &FunctionExtent,
        covered_statements: u64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            function_name: extent.name.clone(),
            start_line: extent.start.line,
            end_line: extent.end.line,
            covered_statements,
            is_covered: covered_statements > 0,
        }
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn covered_statements(&self) -> u64 {
        self.covered_statements
    }

    pub fn is_covered(&self) -> bool {
        self.is_covered
    }
}

/// Aggregate report persisted by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub line_missed: u64,
    pub line_covered: u64,
    pub method_missed: u64,
    pub method_covered: u64,
}

impl Coverage {
    pub fn line_total(&self) -> u64 {
        self.line_covered.saturating_add(self.line_missed)
    }

    pub fn method_total(&self) -> u64 {
        self.method_covered.saturating_add(self.method_missed)
    }

    /// Fraction of statements executed, 0.0 when there are none
    pub fn line_ratio(&self) -> f64 {
        ratio(self.line_covered, self.line_total())
    }

    /// Fraction of functions with at least one executed statement
    pub fn method_ratio(&self) -> f64 {
        ratio(self.method_covered, self.method_total())
    }
}

fn ratio(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}
