//! Config command - inspect and create the configuration file.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use payreg_core::PayregConfig;

use super::{default_config_path, load_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration (API key redacted)
    Show,

    /// Write a configuration file with default values
    Init(InitArgs),

    /// Print one value, e.g. "policy.ceiling"
    Get {
        /// Dotted key path
        key: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show(config_path),
        ConfigCommand::Init(init_args) => init(init_args, config_path),
        ConfigCommand::Get { key } => get(&key, config_path),
        ConfigCommand::Path => path(config_path),
    }
}

fn target_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

fn redacted(config: &PayregConfig) -> anyhow::Result<serde_json::Value> {
    let mut json = serde_json::to_value(config)?;
    if let Some(key) = json.pointer_mut("/llm/api_key") {
        if !key.is_null() {
            *key = serde_json::Value::String("***".to_string());
        }
    }
    Ok(json)
}

fn show(config_path: Option<&str>) -> anyhow::Result<()> {
    let path = target_path(config_path);
    let config = if path.exists() {
        PayregConfig::from_file(&path)?
    } else {
        eprintln!(
            "{} No config file at {}, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
        PayregConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&redacted(&config)?)?);

    Ok(())
}

fn init(args: InitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| target_path(config_path));

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    PayregConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get(key: &str, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let json = redacted(&config)?;

    let pointer = format!("/{}", key.replace('.', "/"));
    let value = json
        .pointer(&pointer)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn path(config_path: Option<&str>) -> anyhow::Result<()> {
    let path = target_path(config_path);

    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'payreg config init' to create a configuration file.");
    }

    Ok(())
}
