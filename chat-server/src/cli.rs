//! CLI parser.

use clap::{Parser, Subcommand};
use dataset::DEFAULT_BOOTSTRAP_LIMIT;

#[derive(Parser)]
#[command(name = "property-chat")]
#[command(about = "UK property chat server with conversation memory", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Serve POST /chat (config from env).
    Serve,
    /// Load a UK price-paid CSV into the dataset (skipped if already populated).
    InitDb {
        #[arg(long)]
        csv: String,
        #[arg(short, long, default_value_t = DEFAULT_BOOTSTRAP_LIMIT)]
        limit: usize,
    },
    /// Print the last N remembered turns, oldest first.
    Recent {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}
