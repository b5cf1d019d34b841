// packages/core/src/interception/interceptor.rs
//! The `socket()` interceptor
//!
//! Forwards each call to the genuine primitive, then tunes TCP sockets:
//!
//! ```text
//! Created ─┬─ Ineligible
//!          └─ Eligible ─┬─ Disabled          (variable absent, zero, negative, garbage)
//!                       └─ Enabled ─┬─ Applied
//!                                   └─ ApplyFailed
//! ```
//!
//! Whatever happens during tuning, the caller gets back exactly what the
//! genuine `socket()` returned, including its `errno` on failure.

use crate::interception::classifier::SocketRequest;
use crate::interception::socket_api::SocketApi;
use crate::utils::config::{TimeoutSource, UserTimeout};
use crate::utils::errors::ShimError;
use libc::c_int;
use nix::errno::Errno;
use std::os::fd::RawFd;
use tracing::{error, info, warn};

/// Terminal state of one intercepted call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningOutcome {
    /// The genuine `socket()` failed; nothing else was attempted
    CreateFailed(Errno),

    /// Not an IPv4/IPv6 TCP socket
    Ineligible,

    /// TCP socket, but no positive timeout configured
    Disabled,

    /// `TCP_USER_TIMEOUT` was set
    Applied(UserTimeout),

    /// Setting `TCP_USER_TIMEOUT` failed; the socket is returned untouched
    ApplyFailed(UserTimeout, Errno),
}

impl TuningOutcome {
    /// Whether a `setsockopt` call was made
    pub fn attempted_apply(&self) -> bool {
        matches!(self, TuningOutcome::Applied(_) | TuningOutcome::ApplyFailed(..))
    }
}

/// Result of one intercepted `socket()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interception {
    /// What the genuine `socket()` returned
    pub result: Result<RawFd, Errno>,

    pub outcome: TuningOutcome,
}

impl Interception {
    /// Convert to the C return convention
    ///
    /// On failure, `errno` is set back to the genuine call's error so that
    /// anything logged in between cannot leak into the caller's view.
    pub fn into_raw(self) -> c_int {
        match self.result {
            Ok(fd) => fd,
            Err(errno) => {
                set_errno(errno);
                -1
            }
        }
    }
}

/// Socket interceptor
#[derive(Debug, Clone)]
pub struct Interceptor<A, S> {
    api: A,
    source: S,
}

impl<A: SocketApi, S: TimeoutSource> Interceptor<A, S> {
    /// Create an interceptor forwarding to `api` and reading timeouts from `source`
    pub const fn new(api: A, source: S) -> Self {
        Self { api, source }
    }

    /// Create a socket through the genuine primitive and tune it if eligible
    pub fn socket(&self, request: SocketRequest) -> Interception {
        match self.api.create(request) {
            Err(errno) => {
                error!("{}", ShimError::SocketCreateFailed(errno));
                Interception {
                    result: Err(errno),
                    outcome: TuningOutcome::CreateFailed(errno),
                }
            }
            Ok(fd) => {
                info!("Created socket with fd: {}", fd);
                Interception {
                    result: Ok(fd),
                    outcome: self.tune(fd, request),
                }
            }
        }
    }

    fn tune(&self, fd: RawFd, request: SocketRequest) -> TuningOutcome {
        if !request.is_tcp() {
            return TuningOutcome::Ineligible;
        }

        let Some(timeout) = self.source.user_timeout() else {
            return TuningOutcome::Disabled;
        };

        match self.api.set_user_timeout(fd, timeout) {
            Ok(()) => {
                info!("Set TCP_USER_TIMEOUT to {} ms on fd {}", timeout, fd);
                TuningOutcome::Applied(timeout)
            }
            Err(errno) => {
                warn!("{}", ShimError::SetOptionFailed(errno));
                TuningOutcome::ApplyFailed(timeout, errno)
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn set_errno(errno: Errno) {
    unsafe { *libc::__errno_location() = errno as c_int }
}

#[cfg(target_os = "android")]
fn set_errno(errno: Errno) {
    unsafe { *libc::__errno() = errno as c_int }
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly"
))]
fn set_errno(errno: Errno) {
    unsafe { *libc::__error() = errno as c_int }
}

#[cfg(any(target_os = "netbsd", target_os = "openbsd"))]
fn set_errno(errno: Errno) {
    unsafe { *libc::__errno() = errno as c_int }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn set_errno(_errno: Errno) {}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Records every call instead of touching the kernel
    struct FakeSocketApi {
        create_result: Result<RawFd, Errno>,
        apply_result: Result<(), Errno>,
        creates: AtomicUsize,
        applied: Mutex<Vec<(RawFd, u32)>>,
    }

    impl FakeSocketApi {
        fn returning(fd: RawFd) -> Self {
            Self {
                create_result: Ok(fd),
                apply_result: Ok(()),
                creates: AtomicUsize::new(0),
                applied: Mutex::new(Vec::new()),
            }
        }

        fn failing_create(errno: Errno) -> Self {
            Self {
                create_result: Err(errno),
                ..Self::returning(0)
            }
        }

        fn failing_apply(fd: RawFd, errno: Errno) -> Self {
            Self {
                apply_result: Err(errno),
                ..Self::returning(fd)
            }
        }

        fn applied(&self) -> Vec<(RawFd, u32)> {
            self.applied.lock().clone()
        }
    }

    impl SocketApi for FakeSocketApi {
        fn create(&self, _request: SocketRequest) -> Result<RawFd, Errno> {
            self.creates.fetch_add(1, Ordering::Relaxed);
            self.create_result
        }

        fn set_user_timeout(&self, fd: RawFd, timeout: UserTimeout) -> Result<(), Errno> {
            self.applied.lock().push((fd, timeout.as_millis()));
            self.apply_result
        }
    }

    fn tcp_v4() -> SocketRequest {
        SocketRequest::new(libc::AF_INET, libc::SOCK_STREAM, 0)
    }

    fn ms(value: u32) -> Option<UserTimeout> {
        UserTimeout::from_millis(value)
    }

    #[test]
    fn test_unset_timeout_leaves_socket_alone() {
        let api = FakeSocketApi::returning(7);
        let interceptor = Interceptor::new(&api, None::<UserTimeout>);

        let result = interceptor.socket(tcp_v4());

        assert_eq!(result.result, Ok(7));
        assert_eq!(result.outcome, TuningOutcome::Disabled);
        assert!(api.applied().is_empty());
        assert_eq!(result.into_raw(), 7);
    }

    #[test]
    fn test_positive_timeout_applied_once() {
        let api = FakeSocketApi::returning(9);
        let interceptor = Interceptor::new(&api, ms(500));

        let result = interceptor.socket(tcp_v4());

        assert_eq!(result.result, Ok(9));
        assert_eq!(result.outcome, TuningOutcome::Applied(ms(500).unwrap()));
        assert_eq!(api.applied(), vec![(9, 500)]);
    }

    #[test]
    fn test_apply_failure_does_not_change_descriptor() {
        let api = FakeSocketApi::failing_apply(11, Errno::ENOPROTOOPT);
        let interceptor = Interceptor::new(&api, ms(500));

        let result = interceptor.socket(tcp_v4());

        assert_eq!(result.result, Ok(11));
        assert_eq!(
            result.outcome,
            TuningOutcome::ApplyFailed(ms(500).unwrap(), Errno::ENOPROTOOPT)
        );
        assert_eq!(api.applied(), vec![(11, 500)]);
        assert_eq!(result.into_raw(), 11);
    }

    #[test]
    fn test_disabling_values_skip_apply() {
        for raw in ["0", "-5", "", "abc"] {
            let api = FakeSocketApi::returning(5);
            let interceptor = Interceptor::new(&api, UserTimeout::parse(raw));

            let result = interceptor.socket(tcp_v4());

            assert_eq!(result.outcome, TuningOutcome::Disabled, "value {:?}", raw);
            assert!(api.applied().is_empty(), "value {:?}", raw);
        }
    }

    #[test]
    fn test_ineligible_sockets_skip_apply() {
        let requests = [
            SocketRequest::new(libc::AF_UNIX, libc::SOCK_STREAM, 0),
            SocketRequest::new(libc::AF_INET, libc::SOCK_DGRAM, 0),
            SocketRequest::new(libc::AF_INET6, libc::SOCK_DGRAM, libc::IPPROTO_UDP),
            SocketRequest::new(libc::AF_INET, libc::SOCK_STREAM, libc::IPPROTO_UDP),
        ];

        for request in requests {
            let api = FakeSocketApi::returning(4);
            let interceptor = Interceptor::new(&api, ms(500));

            let result = interceptor.socket(request);

            assert_eq!(result.result, Ok(4));
            assert_eq!(result.outcome, TuningOutcome::Ineligible, "{:?}", request);
            assert!(api.applied().is_empty());
        }
    }

    #[test]
    fn test_ipv6_with_explicit_tcp_protocol_is_tuned() {
        let api = FakeSocketApi::returning(12);
        let interceptor = Interceptor::new(&api, ms(250));

        let request = SocketRequest::new(libc::AF_INET6, libc::SOCK_STREAM, libc::IPPROTO_TCP);
        let result = interceptor.socket(request);

        assert!(result.outcome.attempted_apply());
        assert_eq!(api.applied(), vec![(12, 250)]);
    }

    #[test]
    fn test_create_failure_propagates_unchanged() {
        let api = FakeSocketApi::failing_create(Errno::EMFILE);
        let interceptor = Interceptor::new(&api, ms(500));

        let result = interceptor.socket(tcp_v4());

        assert_eq!(result.result, Err(Errno::EMFILE));
        assert_eq!(result.outcome, TuningOutcome::CreateFailed(Errno::EMFILE));
        assert!(!result.outcome.attempted_apply());
        assert!(api.applied().is_empty());

        assert_eq!(result.into_raw(), -1);
        assert_eq!(Errno::last(), Errno::EMFILE);
    }

    #[test]
    fn test_repeated_calls_apply_independently() {
        let api = FakeSocketApi::returning(3);
        let interceptor = Interceptor::new(&api, ms(500));

        for _ in 0..5 {
            let result = interceptor.socket(tcp_v4());
            assert_eq!(result.outcome, TuningOutcome::Applied(ms(500).unwrap()));
        }

        assert_eq!(api.creates.load(Ordering::Relaxed), 5);
        assert_eq!(api.applied().len(), 5);
    }

    #[test]
    fn test_concurrent_callers() {
        let api = Arc::new(FakeSocketApi::returning(8));
        let mut handles = vec![];

        for _ in 0..8 {
            let api = Arc::clone(&api);
            handles.push(std::thread::spawn(move || {
                let interceptor = Interceptor::new(api.as_ref(), ms(1000));
                for _ in 0..100 {
                    let result = interceptor.socket(tcp_v4());
                    assert_eq!(result.result, Ok(8));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(api.creates.load(Ordering::Relaxed), 800);
        assert_eq!(api.applied().len(), 800);
    }
}
