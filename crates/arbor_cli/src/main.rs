//! Arbor CLI
//!
//! Command-line tools for Arbor containers.
//!
//! # Commands
//!
//! - `ls` - List the children of a folder
//! - `describe` - Show the description of a node
//! - `tidy` - Compact a container to reclaim space

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Arbor command-line container tools.
#[derive(Parser)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the container file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the children of a folder
    Ls {
        /// Include hidden nodes
        #[arg(short, long)]
        all: bool,

        /// Folder path below the root
        node: Option<String>,
    },

    /// Show the description of a node
    Describe {
        /// Node path below the root
        node: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Compact the container to reclaim space
    Tidy,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Ls { all, node } => {
            let path = cli.path.ok_or("Container path required for ls")?;
            commands::ls::run(&path, node.as_deref(), all)?;
        }
        Commands::Describe { node, format } => {
            let path = cli.path.ok_or("Container path required for describe")?;
            commands::describe::run(&path, &node, &format)?;
        }
        Commands::Tidy => {
            let path = cli.path.ok_or("Container path required for tidy")?;
            commands::tidy::run(&path)?;
        }
        Commands::Version => {
            println!("Arbor CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Container format v{}", arbor_storage::FORMAT_VERSION);
        }
    }

    Ok(())
}
