//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::Path;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use nextbus_core::NextbusConfig;

use super::{config_path, load_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value by dotted key (e.g., "endpoint.timeout_secs")
    Get { key: String },

    /// Change one existing value by dotted key
    Set { key: String, value: String },

    /// Show where the configuration file lives
    Path,
}

pub fn run(args: ConfigArgs, config: Option<&str>) -> anyhow::Result<()> {
    let path = config_path(config);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                println!("{} No config file found, showing defaults.", style("ℹ").blue());
            }
            println!("{}", serde_json::to_string_pretty(&load_config(&path)?)?);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            write_config(&path, &NextbusConfig::default())?;
            println!("{} Created configuration file at {}", style("✓").green(), path.display());
        }
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(load_config(&path)?)?;
            let value = json
                .pointer(&pointer(&key))
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => {
            let mut json = serde_json::to_value(load_config(&path)?)?;

            // Bare words that are not valid JSON are taken as strings.
            let parsed = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let slot = json
                .pointer_mut(&pointer(&key))
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            *slot = parsed.clone();

            let updated: NextbusConfig = serde_json::from_value(json)?;
            write_config(&path, &updated)?;
            println!("{} Set {} = {}", style("✓").green(), key, parsed);
        }
        ConfigCommand::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!("\nRun 'nextbus config init' to create a configuration file.");
            }
        }
    }

    Ok(())
}

/// `endpoint.timeout_secs` -> `/endpoint/timeout_secs`
fn pointer(key: &str) -> String {
    key.split('.')
        .map(|part| format!("/{}", part.replace('~', "~0").replace('/', "~1")))
        .collect()
}

fn write_config(path: &Path, config: &NextbusConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_keys_become_pointers() {
        assert_eq!(pointer("query.max_results"), "/query/max_results");
        assert_eq!(pointer("cache"), "/cache");
        assert_eq!(pointer("a/b"), "/a~1b");
    }
}
