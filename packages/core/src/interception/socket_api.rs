// packages/core/src/interception/socket_api.rs
//! The socket capability the interceptor forwards to
//!
//! [`SocketApi`] stands for "the genuine socket primitives". In a preloaded
//! process it is backed by the `socket()` found through `dlsym(RTLD_NEXT)`;
//! anywhere interposition is not in play it calls libc directly, and tests
//! swap in a fake.

use crate::interception::classifier::SocketRequest;
use crate::interception::sockopt;
use crate::utils::config::UserTimeout;
use libc::c_int;
use nix::errno::Errno;
use std::fmt;
use std::os::fd::RawFd;

/// Signature of the C `socket()` function
pub type SocketFn = unsafe extern "C" fn(c_int, c_int, c_int) -> c_int;

/// Genuine socket creation and tuning
pub trait SocketApi {
    /// Create a socket, returning the descriptor or the `errno` it failed with
    fn create(&self, request: SocketRequest) -> Result<RawFd, Errno>;

    /// Apply `TCP_USER_TIMEOUT` to `fd`
    fn set_user_timeout(&self, fd: RawFd, timeout: UserTimeout) -> Result<(), Errno>;
}

impl<T: SocketApi + ?Sized> SocketApi for &T {
    fn create(&self, request: SocketRequest) -> Result<RawFd, Errno> {
        (**self).create(request)
    }

    fn set_user_timeout(&self, fd: RawFd, timeout: UserTimeout) -> Result<(), Errno> {
        (**self).set_user_timeout(fd, timeout)
    }
}

/// [`SocketApi`] backed by a C `socket()` function pointer and `setsockopt`
#[derive(Clone, Copy)]
pub struct LibcSocketApi {
    create_fn: SocketFn,
}

impl LibcSocketApi {
    /// Use the given `socket()` implementation, typically the resolved one
    pub const fn new(create_fn: SocketFn) -> Self {
        Self { create_fn }
    }

    /// Call libc's `socket()` directly
    ///
    /// Only valid where this crate's own `socket` export is not loaded;
    /// inside the preload library it would call straight back into the hook.
    pub fn direct() -> Self {
        Self::new(libc::socket)
    }
}

impl fmt::Debug for LibcSocketApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibcSocketApi")
            .field("create_fn", &(self.create_fn as *const ()))
            .finish()
    }
}

impl SocketApi for LibcSocketApi {
    fn create(&self, request: SocketRequest) -> Result<RawFd, Errno> {
        let fd = unsafe { (self.create_fn)(request.domain, request.ty, request.protocol) };
        Errno::result(fd)
    }

    fn set_user_timeout(&self, fd: RawFd, timeout: UserTimeout) -> Result<(), Errno> {
        sockopt::set_user_timeout(fd, timeout)
    }
}
