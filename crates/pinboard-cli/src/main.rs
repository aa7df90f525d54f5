//! Pinboard client binary.
//!
//! # Usage
//!
//! ```bash
//! pinboard --port 6000 --name amy
//! pinboard --host board.local --port 6000 --name amy --no-auto-join
//! ```
//!
//! Type `%groups`, `%join <g>`, `%post <g> <subject> | <content>`,
//! `%view <g> <id>` and so on. `%exit` or end of input quits.

use std::io;

use clap::Parser;
use pinboard_cli::Args;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the session; logs go to stderr
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let config = args.client_config();
    tracing::info!(
        host = %config.host,
        port = config.port,
        user = %config.session.user_name,
        "connecting"
    );

    let client = pinboard_app::connect(config).await?;
    let stdin = BufReader::new(tokio::io::stdin());
    let session = pinboard_cli::run(client, stdin, &mut io::stdout()).await?;

    tracing::info!(groups = session.groups().count(), "session ended");

    Ok(())
}
