//! CLI argument definitions using clap
//!
//! Commands:
//! - culturemesh init --config <path>
//! - culturemesh serve --config <path> [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CultureMesh - REST API for location and language based social networks
#[derive(Parser, Debug)]
#[command(name = "culturemesh")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database schema
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./culturemesh.json")]
        config: PathBuf,
    },

    /// Start the HTTP API server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./culturemesh.json")]
        config: PathBuf,

        /// Port to listen on, overriding the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["culturemesh", "serve", "--config", "/etc/cm.json", "--port", "9000"])
            .unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("/etc/cm.json"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_init_default_config_path() {
        let cli = Cli::try_parse_from(["culturemesh", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Init { config } if config == PathBuf::from("./culturemesh.json")
        ));
    }
}
