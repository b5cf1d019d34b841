// packages/core/src/interception/classifier.rs
//! Socket request classification
//!
//! Decides whether a `socket()` request describes a TCP socket: an Internet
//! domain, a stream type once modifier flags are stripped, and either the
//! default or the TCP protocol.

use libc::c_int;

/// Bits of the `type` argument that carry the base socket type
#[cfg(any(target_os = "linux", target_os = "android"))]
const SOCK_TYPE_MASK: c_int = 0xf;

#[cfg(any(
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
const SOCK_TYPE_MASK: c_int = !(libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC);

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
const SOCK_TYPE_MASK: c_int = !0;

/// Arguments of a single `socket(domain, type, protocol)` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketRequest {
    /// Address family (`AF_INET`, `AF_UNIX`, ...)
    pub domain: c_int,

    /// Socket type, possibly with modifier flags such as `SOCK_NONBLOCK`
    pub ty: c_int,

    /// Protocol number, 0 for the family default
    pub protocol: c_int,
}

impl SocketRequest {
    pub const fn new(domain: c_int, ty: c_int, protocol: c_int) -> Self {
        Self {
            domain,
            ty,
            protocol,
        }
    }

    /// Socket type with modifier flags discarded
    pub fn base_type(&self) -> c_int {
        self.ty & SOCK_TYPE_MASK
    }

    /// IPv4 or IPv6
    pub fn is_internet(&self) -> bool {
        self.domain == libc::AF_INET || self.domain == libc::AF_INET6
    }

    pub fn is_stream(&self) -> bool {
        self.base_type() == libc::SOCK_STREAM
    }

    /// Protocol left to the platform or explicitly TCP
    pub fn is_tcp_protocol(&self) -> bool {
        self.protocol == 0 || self.protocol == libc::IPPROTO_TCP
    }

    /// Whether a socket created from this request is eligible for TCP tuning
    pub fn is_tcp(&self) -> bool {
        self.is_internet() && self.is_stream() && self.is_tcp_protocol()
    }
}
