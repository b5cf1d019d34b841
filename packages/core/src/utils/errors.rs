// packages/core/src/utils/errors.rs
//! Error types shared across the shim and the demo application

use nix::errno::Errno;
use thiserror::Error;

/// Errors produced by the shim
#[derive(Error, Debug)]
pub enum ShimError {
    /// The next definition of an intercepted symbol could not be found
    #[error("Failed to find original {symbol}() libc symbol")]
    SymbolNotFound { symbol: String },

    /// The genuine `socket()` call failed
    #[error("Failed to create socket: {0}")]
    SocketCreateFailed(Errno),

    /// Applying `TCP_USER_TIMEOUT` failed
    #[error("Failed to set TCP_USER_TIMEOUT: {0}")]
    SetOptionFailed(Errno),

    /// Reading a socket option back failed
    #[error("Failed to read TCP_USER_TIMEOUT: {0}")]
    GetOptionFailed(Errno),

    /// `<address:port>` argument could not be parsed
    #[error("Invalid endpoint '{input}': {reason}")]
    InvalidEndpoint { input: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShimError {
    /// OS error cause, if this error carries one
    pub fn errno(&self) -> Option<Errno> {
        match self {
            ShimError::SocketCreateFailed(e)
            | ShimError::SetOptionFailed(e)
            | ShimError::GetOptionFailed(e) => Some(*e),
            _ => None,
        }
    }
}

/// Result type alias for shim operations
pub type Result<T> = std::result::Result<T, ShimError>;
