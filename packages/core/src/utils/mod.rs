// packages/core/src/utils/mod.rs
//! Common utilities: configuration and error types

pub mod config;
pub mod errors;

pub use config::{EnvTimeoutSource, TimeoutSource, UserTimeout, TIMEOUT_ENV_VAR};
pub use errors::{Result, ShimError};
