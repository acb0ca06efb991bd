//! # go-ext-cover: Function-Level Coverage for Go
//!
//! Reads a Go coverage profile (`go test -coverprofile`), locates every
//! source file it names, extracts the function and method declarations with
//! tree-sitter, and reduces everything to a four-number summary:
//!
//! - **Lines**: executed and missed statements across all blocks
//! - **Methods**: functions with at least one executed statement, and the rest
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Pipeline                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Profile Loader  │  Source Locator  │  Function  │  Report   │
//! │  (detectors)     │  (io)            │  Extractor │  Writer   │
//! │                  │                  │  (lang)    │  (io)     │
//! │ • mode/blocks    │ • go.mod         │ • func     │ • JSON    │
//! │ • merge dups     │ • GOPATH/GOROOT  │ • method   │           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use go_ext_cover::{generate_report, ReportConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReportConfig::default();
//!     let (results, path) = generate_report(&config)?;
//!
//!     println!(
//!         "{} of {} functions covered, report at {}",
//!         results.coverage.method_covered,
//!         results.coverage.method_total(),
//!         path.display()
//!     );
//!     Ok(())
//! }
//! ```

#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Core configuration, errors and orchestration
pub mod core {
    //! Errors, configuration and the report pipeline.

    pub mod config;
    pub mod errors;
    pub mod pipeline;
}

// Coverage data model and algorithms
pub mod detectors {
    //! Coverage profile parsing, matching and aggregation.

    pub mod coverage;
}

// Language-specific AST adapters
pub mod lang {
    //! Language-specific parsing with tree-sitter.

    pub mod go;
}

// Filesystem lookup and report output
pub mod io {
    //! Source file lookup and report writing.

    pub mod locator;
    pub mod reports;
}

// Re-export primary types for convenience
pub use core::config::{ReportConfig, SourceConfig};
pub use core::errors::{CoverError, Result};
pub use core::pipeline::{generate_report, CoveragePipeline, PipelineResults};
pub use detectors::coverage::{Coverage, FunctionInfo, Profile};
pub use io::locator::{GoSourceLocator, SourceResolver};
pub use io::reports::ReportWriter;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
