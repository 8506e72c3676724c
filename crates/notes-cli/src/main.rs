//! Notes CLI
//!
//! Command-line interface and HTTP server for notes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use notes_core::{Config, NoteStore};

mod commands;
mod editor;
mod logging;
mod output;
mod server;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Notes - a small CRUD store for notes, with a REST API")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create a new note
    #[command(alias = "add")]
    Create {
        /// Note title
        title: String,
        /// Note content (opens editor if not provided)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// List notes, newest first
    #[command(alias = "ls")]
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,
        /// Notes per page (1-100)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=100))]
        per_page: u64,
    },
    /// Show a note
    Show {
        /// Note ID
        id: u64,
    },
    /// Edit a note (only the given fields change)
    Edit {
        /// Note ID
        id: u64,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New content
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID
        id: u64,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Search notes by title or content
    Search {
        /// Case-insensitive substring to look for
        query: String,
    },
    /// Show store status (data file, counts)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_file, host, port, cors_origins, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands must work even when the store can't be opened
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(&config, matches!(cli.command, Commands::Serve { .. }));

    let store = NoteStore::open(config.data_file.clone());

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            server::run(store, &config, &host, port).await
        }
        Commands::Create { title, content } => {
            commands::note::create(&store, title, content, &output)
        }
        Commands::List { page, per_page } => commands::note::list(&store, page, per_page, &output),
        Commands::Show { id } => commands::note::show(&store, id, &output),
        Commands::Edit { id, title, content } => {
            commands::note::edit(&store, id, title, content, &output)
        }
        Commands::Delete { id, yes } => commands::note::delete(&store, id, yes, &output),
        Commands::Search { query } => commands::note::search(&store, query, &output),
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
