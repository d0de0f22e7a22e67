//! CLI definition using clap.

use clap::Parser;
use std::path::PathBuf;

/// heartbeatd - run a heartbeat loop until a terminate signal arrives
#[derive(Parser, Debug)]
#[command(name = "heartbeatd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON settings file
    pub config: PathBuf,
}
