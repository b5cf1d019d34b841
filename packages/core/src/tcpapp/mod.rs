// packages/core/src/tcpapp/mod.rs
//! Ping/pong TCP application
//!
//! A long-lived client/server pair for watching the shim at work: run both
//! under the preload library with `TCP_USER_TIMEOUT_MS` set, then cut the
//! network between them and the connection fails after the configured
//! timeout instead of the kernel's default retransmission budget.

pub mod client;
pub mod endpoint;
pub mod server;

pub use client::{Client, ClientConfig, ClientStats};
pub use endpoint::Endpoint;
pub use server::Server;
