//! CLI parser.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gbot")]
#[command(about = "Gap bot router CLI", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dispatch raw JSON events (one per line) through the demo router.
    Replay {
        /// Event file; stdin when omitted.
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Spawn one task per event instead of dispatching in order.
        #[arg(short, long)]
        concurrent: bool,
    },
}
