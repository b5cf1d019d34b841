// packages/core/src/main.rs
//! tcpapp: ping/pong TCP client and server
//!
//! Used to observe the preload shim on real connections:
//!
//! ```text
//! LD_PRELOAD=libtcp_user_timeout_preload.so TCP_USER_TIMEOUT_MS=5000 tcpapp client server:9000
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tcp_user_timeout::observability::init_tracing;
use tcp_user_timeout::tcpapp::{Client, ClientConfig, Endpoint, Server};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "tcpapp", version, about = "Ping/pong TCP client and server")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Connect to a server and ping it periodically
    Client {
        /// Server address as <address:port>
        endpoint: Endpoint,

        /// Milliseconds between pings and reconnect attempts
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Stop after this many answered pings
        #[arg(long)]
        count: Option<u64>,
    },

    /// Listen and answer every line with pong
    Server {
        /// Listen address as <address:port>
        endpoint: Endpoint,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    info!("tcpapp v{}", tcp_user_timeout::VERSION);

    match cli.mode {
        Mode::Server { endpoint } => {
            let server = Server::bind(&endpoint).await?;
            server.run(shutdown_signal()).await?;
        }
        Mode::Client {
            endpoint,
            interval_ms,
            count,
        } => {
            let config = ClientConfig::new(endpoint)
                .with_interval(Duration::from_millis(interval_ms))
                .with_max_round_trips(count);

            tokio::select! {
                stats = Client::new(config).run() => {
                    info!(
                        "Client finished: {} round-trips over {} connections ({} failures)",
                        stats.round_trips, stats.connections, stats.failures
                    );
                }
                _ = shutdown_signal() => info!("Received shutdown signal, stopping client"),
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
