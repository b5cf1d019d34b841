// packages/core/src/utils/config.rs
//! Timeout configuration
//!
//! The shim has exactly one input: the `TCP_USER_TIMEOUT_MS` environment
//! variable. It is re-read on every eligible `socket()` call, so changes to the
//! environment are picked up by the next call.
//!
//! Values are parsed the way C `atoi` reads them: leading whitespace, an
//! optional sign, then as many decimal digits as are present. Anything that
//! does not start with a number reads as zero. Zero, negative and out-of-range
//! values all mean "disabled".

use std::fmt;
use std::num::NonZeroU32;

/// Environment variable holding the timeout in milliseconds
pub const TIMEOUT_ENV_VAR: &str = "TCP_USER_TIMEOUT_MS";

/// A positive TCP user timeout, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserTimeout(NonZeroU32);

impl UserTimeout {
    /// Largest accepted value (the option is a C `int` in the original ABI)
    pub const MAX_MS: u32 = i32::MAX as u32;

    /// Create a timeout from milliseconds; `None` for 0 or values above `MAX_MS`
    pub fn from_millis(ms: u32) -> Option<Self> {
        if ms > Self::MAX_MS {
            return None;
        }
        NonZeroU32::new(ms).map(Self)
    }

    /// Parse a raw configuration value
    ///
    /// Returns `None` when the value disables tuning: no leading number,
    /// zero, negative, or too large for the option.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = leading_integer(raw)?;
        if value <= 0 {
            return None;
        }
        u32::try_from(value).ok().and_then(Self::from_millis)
    }

    /// Timeout in milliseconds
    pub fn as_millis(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for UserTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_millis())
    }
}

/// Read the leading decimal integer of `raw` the way `atoi` does
///
/// A string without digits reads as 0. `None` means the number did not fit
/// in an `i64`.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start_matches(|c: char| {
        matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
    });

    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Some(0);
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Where the interceptor gets its timeout from
///
/// Implemented by [`EnvTimeoutSource`] in the preloaded shim and by a plain
/// `Option<UserTimeout>` wherever a fixed value is wanted.
pub trait TimeoutSource {
    /// Current timeout, or `None` when tuning is absent or disabled
    fn user_timeout(&self) -> Option<UserTimeout>;
}

impl TimeoutSource for Option<UserTimeout> {
    fn user_timeout(&self) -> Option<UserTimeout> {
        *self
    }
}

impl<T: TimeoutSource + ?Sized> TimeoutSource for &T {
    fn user_timeout(&self) -> Option<UserTimeout> {
        (**self).user_timeout()
    }
}

/// Reads the timeout from the process environment on every call
#[derive(Debug, Clone, Copy)]
pub struct EnvTimeoutSource {
    var: &'static str,
}

impl EnvTimeoutSource {
    /// Source reading `TCP_USER_TIMEOUT_MS`
    pub const fn new() -> Self {
        Self {
            var: TIMEOUT_ENV_VAR,
        }
    }

    /// Source reading a different variable
    pub const fn with_var(var: &'static str) -> Self {
        Self { var }
    }

    /// Name of the variable being read
    pub fn var(&self) -> &'static str {
        self.var
    }
}

impl Default for EnvTimeoutSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeoutSource for EnvTimeoutSource {
    fn user_timeout(&self) -> Option<UserTimeout> {
        let raw = std::env::var_os(self.var)?;
        UserTimeout::parse(&raw.to_string_lossy())
    }
}
