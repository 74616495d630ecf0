//! Command-line interface for strictly_tombola.

use clap::{Parser, Subcommand};
use strictly_tombola::{LayoutKind, SequenceKind};

/// Strictly Tombola - tombola game server
#[derive(Parser, Debug)]
#[command(name = "strictly_tombola")]
#[command(about = "Tombola game server with ticket generation and achievement scoring", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Http {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Ticket layout: sectioned or flat (overrides config)
        #[arg(long)]
        layout: Option<LayoutKind>,

        /// Call sequence: continuous or short_form (overrides config)
        #[arg(long)]
        sequence: Option<SequenceKind>,

        /// Fixed RNG seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a freshly generated ticket
    Ticket {
        /// Ticket layout: sectioned or flat
        #[arg(long, default_value = "sectioned")]
        layout: LayoutKind,

        /// Fixed RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print JSON instead of a grid
        #[arg(long)]
        json: bool,
    },

    /// Print a freshly generated call sequence
    Sequence {
        /// Call sequence: continuous or short_form
        #[arg(long, default_value = "continuous")]
        kind: SequenceKind,

        /// Fixed RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },
}
