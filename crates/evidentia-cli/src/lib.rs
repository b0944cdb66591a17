//! Evidentia CLI library.
//!
//! This library provides the core functionality for the `evidentia` command-line
//! interface: argument parsing, configuration, command execution against a
//! study store, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod prompt;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
