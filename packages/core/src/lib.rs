// packages/core/src/lib.rs
//! TCP user-timeout preload shim
//!
//! Intercepts `socket()` in an unmodified process and, for every IPv4/IPv6
//! TCP socket it creates, applies `TCP_USER_TIMEOUT` from the
//! `TCP_USER_TIMEOUT_MS` environment variable.
//!
//! # Architecture
//!
//! - **interception**: symbol resolution, classification, the interceptor
//! - **observability**: diagnostics and tracing setup
//! - **utils**: configuration and error types
//! - **tcpapp**: ping/pong client and server for exercising the shim
//!
//! The exported `socket` symbol lives in the `tcp-user-timeout-preload`
//! package, which wires these pieces together into a `cdylib`:
//!
//! ```text
//! LD_PRELOAD=libtcp_user_timeout_preload.so TCP_USER_TIMEOUT_MS=5000 ./program
//! ```

pub mod interception;
pub mod observability;
pub mod tcpapp;
pub mod utils;

// Re-export commonly used types
pub use interception::{
    Interception, Interceptor, LibcSocketApi, SocketApi, SocketRequest, TuningOutcome,
};
pub use utils::config::{EnvTimeoutSource, TimeoutSource, UserTimeout, TIMEOUT_ENV_VAR};
pub use utils::errors::{Result, ShimError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
