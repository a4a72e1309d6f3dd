//! Store commands: catalog, screenshots, install and uninstall.

use colored::Colorize;
use extkit_core::ExtensionManager;

use super::print_json;
use crate::error::{CliError, Result};

/// Run `extkit catalog [--refresh] [--json]`
pub async fn run_catalog(manager: &ExtensionManager, refresh: bool, json: bool) -> Result<()> {
    let entries = manager.get_catalog(refresh).await;
    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("{}", "No extensions available".dimmed());
        println!("Run {} to retry the fetch.", "extkit catalog --refresh".cyan());
        return Ok(());
    }

    println!("{}", "Available Extensions".bold());
    println!();
    for entry in &entries {
        print!("  {} {}", entry.name.cyan(), entry.title);
        if !entry.author.is_empty() {
            print!(" {}", format!("by {}", entry.author).dimmed());
        }
        println!();
        if !entry.description.is_empty() {
            println!("      {}", entry.description.dimmed());
        }
    }
    println!();
    println!("{} {} extensions", "Total:".bold(), entries.len());
    Ok(())
}

/// Run `extkit screenshots <name> [--json]`
pub async fn run_screenshots(manager: &ExtensionManager, name: &str, json: bool) -> Result<()> {
    let urls = manager.get_extension_screenshot_urls(name).await;
    if json {
        return print_json(&urls);
    }
    if urls.is_empty() {
        println!("{} No screenshots for '{}'", "=>".blue().bold(), name);
    }
    for url in &urls {
        println!("{}", url);
    }
    Ok(())
}

/// Run `extkit install <name>`
pub async fn run_install(manager: &ExtensionManager, name: &str) -> Result<()> {
    println!("{} Installing '{}'", "=>".blue().bold(), name.cyan());

    let report = manager
        .try_install_extension(name)
        .await
        .map_err(|e| CliError::user(format!("Install of '{}' failed: {}", name, e)))?;

    let verb = if report.replaced { "Reinstalled" } else { "Installed" };
    println!(
        "{} {} '{}' at {}",
        "OK".green().bold(),
        verb,
        report.name.cyan(),
        report.path.display()
    );
    println!(
        "   {} {} built, dependencies {:?}",
        "Commands:".dimmed(),
        report.built_commands,
        report.dependencies
    );
    Ok(())
}

/// Run `extkit uninstall <name>`
pub async fn run_uninstall(manager: &ExtensionManager, name: &str) -> Result<()> {
    let was_installed = manager.resolve_installed_extension(name).is_some();
    if !manager.uninstall_extension(name).await {
        return Err(CliError::user(format!("Uninstall of '{}' failed", name)));
    }
    if was_installed {
        println!("{} Uninstalled '{}'", "OK".green().bold(), name.cyan());
    } else {
        println!("{} '{}' was not installed", "=>".blue().bold(), name);
    }
    Ok(())
}
