//! Commands over installed extensions: build, bundle, commands and schema.

use colored::Colorize;
use extkit_core::ExtensionManager;

use super::print_json;
use crate::error::{CliError, Result};

/// Run `extkit build <name> [--command c]`
pub async fn run_build(
    manager: &ExtensionManager,
    name: &str,
    command: Option<&str>,
) -> Result<()> {
    if manager.resolve_installed_extension(name).is_none() {
        return Err(CliError::user(format!(
            "Extension '{}' is not installed. Run `extkit install {}` first.",
            name, name
        )));
    }

    match command {
        Some(command) => {
            if !manager.build_single_command(name, command).await {
                return Err(CliError::user(format!(
                    "Build of '{}/{}' failed; run with --verbose for details",
                    name, command
                )));
            }
            println!(
                "{} Built '{}/{}'",
                "OK".green().bold(),
                name.cyan(),
                command.cyan()
            );
        }
        None => {
            let built = manager.build_all_commands(name).await;
            let marker = if built == 0 { "!!".yellow().bold() } else { "OK".green().bold() };
            println!("{} Built {} commands of '{}'", marker, built, name.cyan());
        }
    }
    Ok(())
}

/// Run `extkit bundle <name> <command> [--json | --code]`
pub async fn run_bundle(
    manager: &ExtensionManager,
    name: &str,
    command: &str,
    json: bool,
    code: bool,
) -> Result<()> {
    let bundle = manager
        .try_get_extension_bundle(name, command)
        .await
        .map_err(|e| {
            CliError::user(format!(
                "Cannot open '{}/{}': {}. Try reinstalling the extension.",
                name, command, e
            ))
        })?;

    if json {
        return print_json(&bundle);
    }
    if code {
        print!("{}", bundle.code);
        return Ok(());
    }

    println!("{} {}", bundle.extension_title.bold(), bundle.title);
    println!("{}:      {}", "Mode".dimmed(), bundle.mode.cyan());
    if let Some(owner) = &bundle.owner {
        println!("{}:     {}", "Owner".dimmed(), owner);
    }
    println!("{}:  {}", "Artifact".dimmed(), bundle.artifact_path.display());
    println!("{}:   {}", "Support".dimmed(), bundle.support_path.display());
    println!("{}:      {} bytes", "Code".dimmed(), bundle.code.len());

    if !bundle.preference_values.is_empty() {
        println!();
        println!("{}:", "Preference Defaults".bold());
        for (key, value) in &bundle.preference_values {
            println!("  {} = {}", key.cyan(), value);
        }
    }
    if !bundle.arguments.is_empty() {
        println!();
        println!("{}:", "Arguments".bold());
        for arg in &bundle.arguments {
            let required = if arg.required { " (required)" } else { "" };
            println!("  {} {}{}", arg.name.cyan(), arg.kind.dimmed(), required);
        }
    }
    Ok(())
}

/// Run `extkit commands [--json]`
pub fn run_commands(manager: &ExtensionManager, json: bool) -> Result<()> {
    let commands = manager.discover_installed_extension_commands();
    if json {
        return print_json(&commands);
    }

    if commands.is_empty() {
        println!(
            "  {} (use {} to add)",
            "No commands".dimmed(),
            "extkit install".cyan()
        );
        return Ok(());
    }
    for command in &commands {
        println!(
            "  {} {} {}",
            command.id.cyan(),
            command.title,
            format!("[{}]", command.mode).dimmed()
        );
    }
    Ok(())
}

/// Run `extkit schema [--json]`
pub fn run_schema(manager: &ExtensionManager, json: bool) -> Result<()> {
    let schema = manager.get_installed_extensions_settings_schema();
    if json {
        return print_json(&schema);
    }

    for extension in &schema {
        println!("{} ({})", extension.title.bold(), extension.name.dimmed());
        for pref in &extension.preferences {
            println!("  {} {}", pref.name.cyan(), pref.kind.dimmed());
        }
        for command in &extension.commands {
            println!("  {} {}", "+".green(), command.name);
            for pref in &command.preferences {
                println!("      {} {}", pref.name.cyan(), pref.kind.dimmed());
            }
        }
        println!();
    }
    Ok(())
}
