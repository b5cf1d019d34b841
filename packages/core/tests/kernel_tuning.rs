// packages/core/tests/kernel_tuning.rs
//! Interceptor against real kernel sockets
//!
//! These call libc's `socket()` directly (nothing is preloaded in the test
//! binary) and read `TCP_USER_TIMEOUT` back with `getsockopt`.

#![cfg(any(target_os = "linux", target_os = "android"))]

use nix::errno::Errno;
use std::os::fd::{FromRawFd, OwnedFd};
use std::time::Duration;
use tcp_user_timeout::interception::sockopt;
use tcp_user_timeout::{
    EnvTimeoutSource, Interceptor, LibcSocketApi, SocketRequest, TuningOutcome, UserTimeout,
};

fn timeout(ms: u32) -> Option<UserTimeout> {
    UserTimeout::from_millis(ms)
}

fn own(fd: i32) -> OwnedFd {
    unsafe { OwnedFd::from_raw_fd(fd) }
}

#[test]
fn test_ipv4_socket_gets_timeout() {
    let interceptor = Interceptor::new(LibcSocketApi::direct(), timeout(500));

    let result = interceptor.socket(SocketRequest::new(libc::AF_INET, libc::SOCK_STREAM, 0));

    assert_eq!(result.outcome, TuningOutcome::Applied(timeout(500).unwrap()));
    let socket = own(result.result.unwrap());
    assert_eq!(
        sockopt::user_timeout(&socket).unwrap(),
        Some(Duration::from_millis(500))
    );
}

#[test]
fn test_flagged_stream_type_gets_timeout() {
    let interceptor = Interceptor::new(LibcSocketApi::direct(), timeout(1500));
    let ty = libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC;

    let result = interceptor.socket(SocketRequest::new(libc::AF_INET, ty, libc::IPPROTO_TCP));

    let socket = own(result.result.unwrap());
    assert!(result.outcome.attempted_apply());
    assert_eq!(
        sockopt::user_timeout(&socket).unwrap(),
        Some(Duration::from_millis(1500))
    );
}

#[test]
fn test_ipv6_socket_gets_timeout() {
    let interceptor = Interceptor::new(LibcSocketApi::direct(), timeout(750));

    let result = interceptor.socket(SocketRequest::new(libc::AF_INET6, libc::SOCK_STREAM, 0));

    match result.result {
        // Kernels built or booted without IPv6
        Err(Errno::EAFNOSUPPORT) => {}
        Err(e) => panic!("unexpected socket() failure: {}", e),
        Ok(fd) => {
            let socket = own(fd);
            assert_eq!(result.outcome, TuningOutcome::Applied(timeout(750).unwrap()));
            assert_eq!(
                sockopt::user_timeout(&socket).unwrap(),
                Some(Duration::from_millis(750))
            );
        }
    }
}

#[test]
fn test_disabled_leaves_kernel_default() {
    let interceptor = Interceptor::new(LibcSocketApi::direct(), UserTimeout::parse("0"));

    let result = interceptor.socket(SocketRequest::new(libc::AF_INET, libc::SOCK_STREAM, 0));

    assert_eq!(result.outcome, TuningOutcome::Disabled);
    let socket = own(result.result.unwrap());
    assert_eq!(sockopt::user_timeout(&socket).unwrap(), None);
}

#[test]
fn test_udp_and_unix_sockets_untouched() {
    let interceptor = Interceptor::new(LibcSocketApi::direct(), timeout(500));

    for request in [
        SocketRequest::new(libc::AF_INET, libc::SOCK_DGRAM, 0),
        SocketRequest::new(libc::AF_INET, libc::SOCK_DGRAM, libc::IPPROTO_UDP),
        SocketRequest::new(libc::AF_UNIX, libc::SOCK_STREAM, 0),
    ] {
        let result = interceptor.socket(request);
        assert_eq!(result.outcome, TuningOutcome::Ineligible, "{:?}", request);
        drop(own(result.result.unwrap()));
    }
}

#[test]
fn test_creation_failure_keeps_errno() {
    let interceptor = Interceptor::new(LibcSocketApi::direct(), timeout(500));

    let result = interceptor.socket(SocketRequest::new(-1, libc::SOCK_STREAM, 0));

    assert_eq!(result.outcome, TuningOutcome::CreateFailed(Errno::EAFNOSUPPORT));
    assert_eq!(result.into_raw(), -1);
    assert_eq!(Errno::last(), Errno::EAFNOSUPPORT);
}

#[test]
fn test_environment_change_seen_by_next_call() {
    let source = EnvTimeoutSource::with_var("TCP_USER_TIMEOUT_MS_KERNEL_TEST");
    let interceptor = Interceptor::new(LibcSocketApi::direct(), source);
    let request = SocketRequest::new(libc::AF_INET, libc::SOCK_STREAM, 0);

    std::env::remove_var(source.var());
    let first = interceptor.socket(request);
    assert_eq!(first.outcome, TuningOutcome::Disabled);
    drop(own(first.result.unwrap()));

    std::env::set_var(source.var(), "2000");
    let second = interceptor.socket(request);
    let socket = own(second.result.unwrap());
    assert_eq!(
        sockopt::user_timeout(&socket).unwrap(),
        Some(Duration::from_secs(2))
    );

    std::env::remove_var(source.var());
}
