// packages/core/src/interception/sockopt.rs
//! `TCP_USER_TIMEOUT` socket option access

use crate::utils::config::UserTimeout;
use crate::utils::errors::Result;
use nix::errno::Errno;
use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;

#[cfg(any(target_os = "linux", target_os = "android"))]
use crate::utils::errors::ShimError;
#[cfg(any(target_os = "linux", target_os = "android"))]
use libc::{c_uint, c_void, socklen_t};
#[cfg(any(target_os = "linux", target_os = "android"))]
use std::mem;

/// Set `TCP_USER_TIMEOUT` (milliseconds) on `fd`
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn set_user_timeout(fd: RawFd, timeout: UserTimeout) -> std::result::Result<(), Errno> {
    let value: c_uint = timeout.as_millis();
    let ret = unsafe {
        libc::setsockopt(
            fd,
            libc::IPPROTO_TCP,
            libc::TCP_USER_TIMEOUT,
            &value as *const c_uint as *const c_void,
            mem::size_of::<c_uint>() as socklen_t,
        )
    };
    Errno::result(ret).map(drop)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn set_user_timeout(_fd: RawFd, _timeout: UserTimeout) -> std::result::Result<(), Errno> {
    Err(Errno::ENOPROTOOPT)
}

/// Read `TCP_USER_TIMEOUT` back from a socket
///
/// `None` means the option is unset (zero, the kernel default).
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn user_timeout<F: AsRawFd + ?Sized>(socket: &F) -> Result<Option<Duration>> {
    let mut value: c_uint = 0;
    let mut len = mem::size_of::<c_uint>() as socklen_t;
    let ret = unsafe {
        libc::getsockopt(
            socket.as_raw_fd(),
            libc::IPPROTO_TCP,
            libc::TCP_USER_TIMEOUT,
            &mut value as *mut c_uint as *mut c_void,
            &mut len,
        )
    };
    Errno::result(ret).map_err(ShimError::GetOptionFailed)?;

    Ok((value > 0).then(|| Duration::from_millis(u64::from(value))))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn user_timeout<F: AsRawFd + ?Sized>(_socket: &F) -> Result<Option<Duration>> {
    Ok(None)
}
