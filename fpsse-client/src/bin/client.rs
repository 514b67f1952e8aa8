use clap::Parser;
use fpsse_client::config::Config;
use fpsse_client::logging::build_logger;
use fpsse_client::{Client, Secrets};
use slog::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let logger = build_logger(config.log_format, config.verbose);

    if config.setup {
        let (secrets, pk) = Secrets::setup_new(&config.storage)?;
        info!(logger, "generated fresh client secrets"; "storage" => %config.storage.display());
        let mut client = Client::connect(secrets, config.address.clone()).await?;
        client.setup().await?;
        info!(logger, "server setup complete"; "public_key_bytes" => pk.to_bytes().len());
        return Ok(());
    }

    let secrets = Secrets::setup_from_directory(&config.storage)?;
    let _client = Client::connect(secrets, config.address).await?;
    info!(logger, "client connected and ready");
    Ok(())
}
