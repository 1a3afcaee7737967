use anyhow::Result;
use clap::Parser;
use frond::{ReconnectionConfig, Server, ServerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Serve an Atom feed of IPFS publish notifications.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to serve the HTTP feed on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    addr: String,

    /// Base URL of the IPFS HTTP API.
    #[arg(long, default_value = "http://localhost:5001")]
    api: String,

    /// Pubsub topic to subscribe to.
    #[arg(long, default_value = "publish")]
    topic: String,

    /// Maximum number of publishes to keep track of.
    #[arg(long = "feedsize", default_value_t = 10)]
    feed_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            interrupt.cancel();
        }
    });

    let config = ServerConfig {
        listen_addr: args.addr,
        api_url: args.api,
        topic: args.topic,
        feed_size: args.feed_size,
        reconnection: ReconnectionConfig::default(),
    };
    Server::new(config).serve(cancel).await
}
