//! Logging setup
//!
//! Log level comes from NOTES_LOG, then RUST_LOG, then a default that is
//! quieter for one-shot commands than for the server. Logs go to
//! `config.log_file` when set, stderr otherwise.

use std::fs::OpenOptions;

use notes_core::Config;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "NOTES_LOG";

/// Initialize the global tracing subscriber
pub fn init(config: &Config, serving: bool) {
    let filter = build_filter(serving);

    if let Some(ref log_path) = config.log_file {
        match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(file)
                    .with_ansi(false)
                    .try_init();
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_filter(serving: bool) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        return EnvFilter::new(directives);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(serving)))
}

fn default_level(serving: bool) -> &'static str {
    if serving {
        "info"
    } else {
        "warn"
    }
}
