//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use notes_core::config::{parse_list, parse_optional_path};
use notes_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_file": config.data_file,
                    "host": config.host,
                    "port": config.port,
                    "cors_origins": config.cors_origins,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", display_path(&config.data_file, "(memory only)"));
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!(
                "  data_file:    {}",
                display_path(&config.data_file, "(memory only)")
            );
            println!("  host:         {}", config.host);
            println!("  port:         {}", config.port);
            println!("  cors_origins: {}", config.cors_origins.join(", "));
            println!(
                "  log_file:     {}",
                display_path(&config.log_file, "(not set)")
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match key.as_str() {
        "data_file" => {
            config.data_file = parse_optional_path(&value);
        }
        "host" => {
            if value.trim().is_empty() {
                bail!("host must not be empty");
            }
            config.host = value.trim().to_string();
        }
        "port" => {
            config.port = value
                .parse()
                .context("Invalid value for port. Use a number between 0 and 65535.")?;
        }
        "cors_origins" => {
            config.cors_origins = parse_list(&value);
        }
        "log_file" => {
            config.log_file = parse_optional_path(&value);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_file, host, port, cors_origins, log_file",
                key
            );
        }
    }

    match config_path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
    .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn display_path(path: &Option<PathBuf>, unset: &str) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| unset.to_string())
}
