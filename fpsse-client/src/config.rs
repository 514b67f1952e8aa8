//! CLI configuration for the client binary (SPEC_FULL §6.1).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// A client that issues `update`/`search` requests against a running server.
#[derive(Parser, Debug)]
#[command(name = "fpsse-client", version, about)]
pub struct Config {
    /// Path to the client's secrets directory.
    pub storage: PathBuf,

    /// Address of the server to connect to, e.g. `http://127.0.0.1:4433`.
    pub address: String,

    /// Create fresh secrets at `storage` instead of loading existing ones.
    #[arg(long)]
    pub setup: bool,

    /// Enable debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}
