//! Status command handler

use anyhow::Result;

use notes_core::{Config, NoteStore};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &NoteStore, config: &Config, output: &Output) -> Result<()> {
    let data_file = store.data_file();
    let file_size = data_file
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_file": data_file,
                    "data_file_exists": file_size.is_some(),
                    "data_file_size": file_size,
                    "notes": store.count(),
                    "next_id": store.next_id(),
                    "server": {
                        "host": config.host,
                        "port": config.port
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.count());
        }
        OutputFormat::Human => {
            println!("Notes Status");
            println!("============");
            println!();
            println!("Storage:");
            match data_file {
                Some(path) => {
                    println!("  File: {}", path.display());
                    match file_size {
                        Some(size) => println!("  Size: {} bytes", size),
                        None => println!("  Size: (not written yet)"),
                    }
                }
                None => println!("  File: (memory only)"),
            }
            println!();
            println!("Server:");
            println!("  Address: {}:{}", config.host, config.port);
            println!();
            println!("Contents:");
            println!("  Notes:   {}", store.count());
            println!("  Next ID: {}", store.next_id());
        }
    }

    Ok(())
}
