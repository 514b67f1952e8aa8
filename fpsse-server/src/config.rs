//! CLI configuration for the server binary (SPEC_FULL §6.1).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// A server that accepts `setup`/`update`/`bulk_insert`/`search` RPCs.
#[derive(Parser, Debug)]
#[command(name = "fpsse-server", version, about)]
pub struct Config {
    /// Directory holding the server's EDB (`pairs.dat/`).
    pub storage: PathBuf,

    /// Address to listen on, e.g. `127.0.0.1:4433`.
    pub address: String,

    /// Enable debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}
