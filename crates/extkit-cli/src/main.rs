//! extkit CLI
//!
//! The command-line interface for browsing, installing and running launcher
//! extensions.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use extkit_core::{ExtensionManager, ExtkitConfig};

use cli::{Cli, Commands};
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} Launcher extension manager", "extkit".green().bold());
        println!();
        println!("Run {} for available commands.", "extkit --help".cyan());
        return Ok(());
    };

    let config = ExtkitConfig::load(cli.config.as_deref())?;
    tracing::debug!(data_dir = ?config.paths.data_dir, "Configuration loaded");
    if command == Commands::Config {
        return commands::run_config(&config);
    }

    let manager = ExtensionManager::from_config(config)?;
    let result = execute_command(&manager, command).await;
    manager.shutdown();
    result
}

async fn execute_command(manager: &ExtensionManager, command: Commands) -> Result<()> {
    match command {
        Commands::Catalog { refresh, json } => commands::run_catalog(manager, refresh, json).await,
        Commands::Screenshots { name, json } => {
            commands::run_screenshots(manager, &name, json).await
        }
        Commands::Install { name } => commands::run_install(manager, &name).await,
        Commands::Uninstall { name } => commands::run_uninstall(manager, &name).await,
        Commands::Build { name, command } => {
            commands::run_build(manager, &name, command.as_deref()).await
        }
        Commands::Bundle {
            name,
            command,
            json,
            code,
        } => commands::run_bundle(manager, &name, &command, json, code).await,
        Commands::Commands { json } => commands::run_commands(manager, json),
        Commands::Schema { json } => commands::run_schema(manager, json),
        Commands::Config => commands::run_config(manager.config()),
    }
}
