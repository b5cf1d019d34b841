// packages/core/src/tcpapp/server.rs
//! Ping/pong server
//!
//! Answers every line a client sends with `pong`. Each client is served on
//! its own task.

use crate::tcpapp::endpoint::Endpoint;
use crate::utils::errors::Result;
use std::future::Future;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

const RESPONSE: &str = "pong";

/// Listening ping/pong server
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind the listening socket
    pub async fn bind(endpoint: &Endpoint) -> Result<Self> {
        let listener = TcpListener::bind(endpoint.as_pair()).await?;
        info!("Server started on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept clients until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Received shutdown signal, stopping server");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            info!("Client connected from {}", peer);
                            tokio::spawn(handle_client(stream, peer));
                        }
                        Err(e) => warn!("Failed to accept connection: {}", e),
                    }
                }
            }
        }
    }
}

async fn handle_client(stream: TcpStream, peer: SocketAddr) {
    if let Err(e) = serve_client(stream, peer).await {
        warn!("Error in client handler for {}: {}", peer, e);
    }
}

async fn serve_client(stream: TcpStream, peer: SocketAddr) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(request) = lines.next_line().await? {
        info!("Received from {}: {}", peer, request);
        writer.write_all(RESPONSE.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        info!("Sent to {}: {}", peer, RESPONSE);
    }

    info!("Client {} disconnected", peer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_server_answers_pong() {
        let server = Server::bind(&Endpoint::new("127.0.0.1", 0)).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(async {
            let _ = stop_rx.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"ping\nping\n").await.unwrap();

        let mut buf = [0u8; 10];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"pong\npong\n");

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
