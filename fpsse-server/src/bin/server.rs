use std::sync::Arc;

use clap::Parser;
use fpsse_proto::fpsse_server::FpsseServer;
use fpsse_server::config::Config;
use fpsse_server::logging::build_logger;
use fpsse_server::{FpsseService, Server};
use slog::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let logger = build_logger(config.log_format, config.verbose);

    let server = Arc::new(Server::open(&config.storage, logger.clone())?);
    let addr = config.address.parse()?;

    info!(logger, "listening"; "address" => %addr, "storage" => %config.storage.display());

    tonic::transport::Server::builder()
        .add_service(FpsseServer::new(FpsseService::new(server)))
        .serve(addr)
        .await?;

    Ok(())
}
