//! CLI module for CultureMesh
//!
//! Provides command-line interface for:
//! - init: Create the database schema
//! - serve: Boot the store and serve the HTTP API

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
