//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// extkit - Browse, install and run launcher extensions
#[derive(Parser, Debug)]
#[command(name = "extkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to <config dir>/extkit/config.toml)
    #[arg(long, global = true, env = "EXTKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List extensions available in the store
    Catalog {
        /// Ignore cached data and fetch again
        #[arg(long)]
        refresh: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List screenshot URLs of a store extension
    Screenshots {
        /// Extension name
        name: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Install or reinstall an extension from the store
    ///
    /// Examples:
    ///   extkit install weather
    Install {
        /// Extension name
        name: String,
    },

    /// Remove an installed extension and its build cache
    Uninstall {
        /// Extension name
        name: String,
    },

    /// Rebuild an installed extension's commands
    Build {
        /// Extension name
        name: String,

        /// Rebuild only this command
        #[arg(short, long)]
        command: Option<String>,
    },

    /// Show the bundle the launcher runs for a command
    Bundle {
        /// Extension name
        name: String,

        /// Command name
        command: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Print only the compiled code
        #[arg(long, conflicts_with = "json")]
        code: bool,
    },

    /// List commands of every installed extension
    Commands {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show preference and argument schema of installed extensions
    Schema {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}
