// packages/core/src/tcpapp/client.rs
//! Ping/pong client
//!
//! Connects, reports the `TCP_USER_TIMEOUT` the connection ended up with, then
//! sends `ping` once per interval and waits for the reply. Lost connections
//! are retried after one interval.

use crate::interception::sockopt;
use crate::tcpapp::endpoint::Endpoint;
use crate::utils::errors::Result;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const REQUEST: &str = "ping";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server to talk to
    pub endpoint: Endpoint,

    /// Pause between pings and between reconnect attempts
    pub interval: Duration,

    /// Stop after this many successful round-trips (unbounded if `None`)
    pub max_round_trips: Option<u64>,
}

impl ClientConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            interval: Duration::from_secs(1),
            max_round_trips: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_round_trips(mut self, max: Option<u64>) -> Self {
        self.max_round_trips = max;
        self
    }
}

/// Counters reported when the client stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Connections established
    pub connections: u64,

    /// Pings answered
    pub round_trips: u64,

    /// Connection attempts or sessions that ended in an error
    pub failures: u64,
}

/// How a connected session ended
enum SessionEnd {
    Completed,
    ServerClosed,
}

/// Ping/pong client
pub struct Client {
    config: ClientConfig,
    stats: ClientStats,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            stats: ClientStats::default(),
        }
    }

    /// Run until the configured number of round-trips is reached
    ///
    /// Without a limit this only returns if the surrounding task is dropped.
    pub async fn run(mut self) -> ClientStats {
        loop {
            info!("Attempting connection to {}", self.config.endpoint);

            match self.session().await {
                Ok(SessionEnd::Completed) => return self.stats,
                Ok(SessionEnd::ServerClosed) => warn!("Server closed connection"),
                Err(e) => {
                    self.stats.failures += 1;
                    warn!("Connection error: {}", e);
                }
            }

            sleep(self.config.interval).await;
        }
    }

    fn is_done(&self) -> bool {
        self.config
            .max_round_trips
            .map_or(false, |max| self.stats.round_trips >= max)
    }

    async fn session(&mut self) -> Result<SessionEnd> {
        if self.is_done() {
            return Ok(SessionEnd::Completed);
        }

        let stream = TcpStream::connect(self.config.endpoint.as_pair()).await?;
        self.stats.connections += 1;
        info!("Connected to server {}", self.config.endpoint);
        report_user_timeout(&stream);

        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        loop {
            info!("Sending: {}", REQUEST);
            writer.write_all(REQUEST.as_bytes()).await?;
            writer.write_all(b"\n").await?;

            match lines.next_line().await? {
                Some(response) => {
                    info!("Received: {}", response);
                    self.stats.round_trips += 1;
                }
                None => return Ok(SessionEnd::ServerClosed),
            }

            if self.is_done() {
                return Ok(SessionEnd::Completed);
            }
            sleep(self.config.interval).await;
        }
    }
}

fn report_user_timeout(stream: &TcpStream) {
    match sockopt::user_timeout(stream) {
        Ok(Some(timeout)) => info!("TCP_USER_TIMEOUT is {} ms", timeout.as_millis()),
        Ok(None) => info!("TCP_USER_TIMEOUT is not set"),
        Err(e) => debug!("Could not inspect connection: {}", e),
    }
}
