//! Command line interface.

use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod output;

pub use commands::Commands;

#[derive(Parser, Debug)]
#[command(name = "gistskill", version, about = "Install, share and trust agent skills stored as gists and snippets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (replaces the global config)
    #[arg(long, global = true, env = "GISTSKILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
