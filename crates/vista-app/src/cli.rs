use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vista: headless driver for the webview panel coordinator.
#[derive(Parser, Debug)]
#[command(name = "vista", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Storage directory override.
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a JSON script of coordinator commands and print extension-host
    /// notifications as JSON lines.
    Replay {
        /// Path to a JSON array of commands.
        script: PathBuf,
    },
    /// List persisted panel records.
    Inspect,
}

pub fn parse() -> Args {
    Args::parse()
}
