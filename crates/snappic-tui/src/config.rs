use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "snappic", about = "Terminal client for the SnapPic photo feed")]
pub struct Cli {
    /// Backend URL
    #[arg(
        long,
        global = true,
        env = "SNAPPIC_SERVER_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    pub server: String,

    /// Gallery refresh interval in milliseconds
    #[arg(long, global = true, env = "SNAPPIC_POLL_INTERVAL_MS", default_value = "2000")]
    pub poll_interval_ms: u64,

    /// Write logs to this file. The gallery discards logs when unset,
    /// since the terminal is taken by the UI.
    #[arg(long, global = true, env = "SNAPPIC_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Open the live gallery (default)
    Gallery,
    /// Upload an image without opening the gallery
    Upload {
        /// Image file to send
        path: PathBuf,
        /// Optional caption
        #[arg(long, short, default_value = "")]
        comment: String,
    },
    /// Print the current gallery once and exit
    List,
}

impl Cli {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Gallery)
    }
}
