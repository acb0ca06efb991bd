//! CLI Module Organization
//!
//! - args: argument definitions
//! - commands: the report run
//! - config_layer: layering of defaults, config file and flags

pub mod args;
pub mod commands;
pub mod config_layer;

pub use args::*;
pub use commands::*;
