//! recset CLI
//!
//! Command-line tools for RecordIO and TFRecord containers.
//!
//! # Commands
//!
//! - `inspect` - Summarize a container file
//! - `dump` - Print record headers or example features
//! - `verify` - Read every record and report framing and decode errors
//! - `index` - Print a listing index, optionally checked against its data file
//! - `datasets` - List registered datasets and their working directories

mod commands;

use clap::{Parser, Subcommand};
use recset_core::{register_builtin, Config, DatasetContext, DatasetRegistry, Sha256Verifier};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// recset container and dataset tools.
#[derive(Parser)]
#[command(name = "recset")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset working directory (overrides RECSET_WORKING_DIRECTORY)
    #[arg(global = true, short = 'w', long)]
    working_directory: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a container file
    Inspect {
        /// Container file
        path: PathBuf,

        /// Container kind (auto, recordio, tfrecord)
        #[arg(short, long, default_value = "auto")]
        kind: String,

        /// Count records per label
        #[arg(short, long)]
        labels: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print record headers or example features
    Dump {
        /// Container file
        path: PathBuf,

        /// Container kind (auto, recordio, tfrecord)
        #[arg(short, long, default_value = "auto")]
        kind: String,

        /// Skip this many records first
        #[arg(short, long, default_value = "0")]
        skip: usize,

        /// Maximum number of records to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Read every record and report errors
    Verify {
        /// Container file
        path: PathBuf,

        /// Container kind (auto, recordio, tfrecord)
        #[arg(short, long, default_value = "auto")]
        kind: String,

        /// Also decode every image payload
        #[arg(short, long)]
        decode: bool,
    },

    /// Print a listing index
    Index {
        /// Listing file
        listing: PathBuf,

        /// RecordIO data file to check the ranges against
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List registered datasets
    Datasets {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

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
        Commands::Inspect {
            path,
            kind,
            labels,
            format,
        } => commands::inspect::run(&path, &kind, labels, &format)?,
        Commands::Dump {
            path,
            kind,
            skip,
            limit,
            format,
        } => commands::dump::run(&path, &kind, skip, limit, &format)?,
        Commands::Verify { path, kind, decode } => commands::verify::run(&path, &kind, decode)?,
        Commands::Index {
            listing,
            data,
            format,
        } => commands::index::run(&listing, data.as_deref(), &format)?,
        Commands::Datasets { format } => {
            let mut config = Config::from_env();
            if let Some(dir) = cli.working_directory {
                config = config.working_directory(dir);
            }
            let ctx = DatasetContext::new(config).with_verifier(Arc::new(Sha256Verifier));
            let mut registry = DatasetRegistry::new();
            register_builtin(&mut registry)?;
            commands::datasets::run(&registry, &ctx, &format)?;
        }
        Commands::Version => {
            println!("recset CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("recset Core v{}", recset_core::VERSION);
        }
    }

    Ok(())
}
