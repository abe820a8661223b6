//! CLI command definitions for the `parley` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Chat and message HTTP service.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML config file. Missing files fall back to defaults.
    #[arg(long, global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Bind address (overrides config and PARLEY_HOST).
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides config and PARLEY_PORT).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Apply database migrations and exit.
    Migrate,
}

impl Cli {
    /// The subcommand to run, `serve` when none was given.
    pub fn resolved_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
        })
    }
}
