use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "homerows")]
#[command(author, version, about = "Netflix-style home rows for a media library")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config or defaults if not specified)
        config: Option<PathBuf>,
    },

    /// Print the home rows for a user
    Rows {
        /// User ID
        #[arg(short, long)]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one page of a single row as JSON
    RowItems {
        /// User ID
        #[arg(short, long)]
        user: String,

        /// Row kind (mylist, recentlyadded, randompicks, longnotwatched, genre)
        #[arg(short, long)]
        kind: String,

        /// Genre name, required for genre rows
        #[arg(short, long)]
        genre: Option<String>,

        /// Index of the first item
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Page size
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Shuffle seed for random rows
        #[arg(long)]
        seed: Option<u64>,
    },
}
