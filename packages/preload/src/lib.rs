// packages/preload/src/lib.rs
//! Preload library exporting the `socket()` hook
//!
//! ```text
//! LD_PRELOAD=/path/to/libtcp_user_timeout_preload.so TCP_USER_TIMEOUT_MS=5000 ./program
//! ```
//!
//! Everything besides the export and the load-time constructor lives in the
//! `tcp-user-timeout` library, so that the hook is only ever linked into this
//! shared object.

use libc::c_int;
use tcp_user_timeout::interception::resolver;
use tcp_user_timeout::observability::init_diagnostics;
use tcp_user_timeout::{EnvTimeoutSource, Interceptor, LibcSocketApi, SocketRequest};

/// Runs when the dynamic loader maps this library, before `main`
extern "C" fn init() {
    init_diagnostics();
    resolver::install();
}

#[used]
#[cfg_attr(
    any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ),
    link_section = ".init_array"
)]
#[cfg_attr(any(target_os = "macos", target_os = "ios"), link_section = "__DATA,__mod_init_func")]
static INIT: extern "C" fn() = init;

/// Replacement for libc's `socket()`
#[no_mangle]
pub extern "C" fn socket(domain: c_int, ty: c_int, protocol: c_int) -> c_int {
    let api = LibcSocketApi::new(resolver::genuine_socket());
    Interceptor::new(api, EnvTimeoutSource::new())
        .socket(SocketRequest::new(domain, ty, protocol))
        .into_raw()
}
