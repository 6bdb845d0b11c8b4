mod config;
mod error;
mod serve;

use clap::Parser;
use config::{Cli, ServerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match ServerConfig::resolve(cli) {
        Ok(config) => serve::run(config).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "frontpage-server failed");
        std::process::exit(1);
    }
}
