// packages/core/src/interception/mod.rs
//! `socket()` interception
//!
//! - **Resolver**: finds and caches the genuine `socket()` behind our export
//! - **Socket API**: the genuine primitives as an injectable trait
//! - **Classifier**: tells TCP requests apart from everything else
//! - **Interceptor**: forwards the call and applies `TCP_USER_TIMEOUT`
//! - **Sockopt**: raw `TCP_USER_TIMEOUT` get/set
//!
//! # Architecture
//!
//! ```text
//! Host Code (Unmodified)
//!     │
//!     └─ socket() → Interceptor → genuine socket() (resolved via RTLD_NEXT)
//!                        │
//!                        └─ TCP? + TCP_USER_TIMEOUT_MS > 0 → setsockopt()
//! ```

pub mod classifier;
pub mod interceptor;
pub mod resolver;
pub mod socket_api;
pub mod sockopt;

// Re-export commonly used types
pub use classifier::SocketRequest;
pub use interceptor::{Interception, Interceptor, TuningOutcome};
pub use socket_api::{LibcSocketApi, SocketApi, SocketFn};
