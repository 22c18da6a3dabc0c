use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use me3_server::{tracing::init_tracing_logs_if_set, DataDir, Me3Server};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the data directory holding config.toml and the templates.
    #[clap(short, long, default_value = "~/.me3")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let data_dir = DataDir::new(args.data_dir);

    init_tracing_logs_if_set(data_dir.path())?;

    let server = Me3Server::from_data_dir(data_dir).await?;
    tracing::info!("me3 server running on {}", server.url());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    drop(server);

    Ok(())
}
