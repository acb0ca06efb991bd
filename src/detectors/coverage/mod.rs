//! Go coverage profiles, function matching and summary aggregation.

pub mod aggregate;
pub mod matcher;
pub mod parsers;
pub mod types;

pub use aggregate::{aggregate, line_totals, summarize, LineTotals, MethodTotals};
pub use matcher::{covered_statements, match_function, match_profile};
pub use parsers::{parse_profiles, parse_profiles_from_str};
pub use types::*;
