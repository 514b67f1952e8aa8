//! Demo bulk-loader (SPEC_FULL §4.8): drives `async_update` over a
//! line-delimited `keyword\tdocument_id` file using a fixed-size worker pool,
//! mirroring the reference loader's `ThreadPool pool(8)`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fpsse_client::logging::build_logger;
use fpsse_client::{config::LogFormat, Client, Secrets};
use slog::info;
use tokio::io::{AsyncBufReadExt, BufReader};

const WORKER_COUNT: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "fpsse-bulk-load", version, about)]
struct Args {
    /// Path to the client's secrets directory.
    storage: PathBuf,

    /// Address of the server to connect to.
    address: String,

    /// Line-delimited `keyword\tdocument_id` file to load.
    input: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logger = build_logger(args.log_format, args.verbose);

    let secrets = Secrets::setup_from_directory(&args.storage)?;
    let client = Arc::new(Client::connect(secrets, args.address).await?);

    let file = tokio::fs::File::open(&args.input).await?;
    let mut lines = BufReader::new(file).lines();

    let mut pairs = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let Some((kw, id)) = line.split_once('\t') else {
            continue;
        };
        let id: u64 = id.trim().parse()?;
        pairs.push((kw.to_string(), id));
    }
    info!(logger, "loaded bulk-insert lines"; "count" => pairs.len());

    let chunks: Vec<Vec<(String, u64)>> = pairs
        .chunks((pairs.len() / WORKER_COUNT).max(1) + 1)
        .map(|c| c.to_vec())
        .collect();

    let mut workers = Vec::new();
    for chunk in chunks {
        let client = Arc::clone(&client);
        workers.push(tokio::spawn(async move {
            for (kw, id) in chunk {
                client.async_update(kw.into_bytes(), id);
            }
        }));
    }
    for worker in workers {
        worker.await?;
    }

    client.wait_updates_completion().await?;
    info!(logger, "bulk load complete");
    Ok(())
}
