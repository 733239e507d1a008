//! Tooling & Integration Layer
//!
//! Command-line entry points over the background resolver.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
