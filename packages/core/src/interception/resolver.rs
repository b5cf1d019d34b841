// packages/core/src/interception/resolver.rs
//! Resolution of the genuine `socket()` primitive
//!
//! The preload library exports its own `socket`, so the dynamic loader hands
//! every caller our hook first. The real implementation is the *next*
//! definition in load order, found with `dlsym(RTLD_NEXT, "socket")`.
//!
//! The handle is resolved once, from the preload library's load-time
//! constructor, and never changes afterwards. If a socket is created before
//! that constructor runs (another library's constructor, say), the first
//! call resolves it instead. Failing to resolve is fatal: without the real
//! primitive no socket can be created, and falling back to our own export
//! would recurse.

use crate::interception::socket_api::SocketFn;
use crate::observability;
use crate::utils::errors::{Result, ShimError};
use libc::c_void;
use once_cell::sync::OnceCell;
use std::ffi::CStr;
use std::ptr::NonNull;
use tracing::{debug, error};

const SOCKET_SYMBOL: &[u8] = b"socket\0";

static GENUINE_SOCKET: OnceCell<SocketFn> = OnceCell::new();

/// Look up the next definition of `symbol` after the calling object
pub fn resolve_next(symbol: &CStr) -> Result<NonNull<c_void>> {
    let ptr = unsafe { libc::dlsym(libc::RTLD_NEXT, symbol.as_ptr()) };
    NonNull::new(ptr).ok_or_else(|| ShimError::SymbolNotFound {
        symbol: symbol.to_string_lossy().into_owned(),
    })
}

/// Locate the genuine `socket()` without caching it
pub fn resolve() -> Result<SocketFn> {
    let symbol = CStr::from_bytes_with_nul(SOCKET_SYMBOL).map_err(|_| {
        ShimError::SymbolNotFound {
            symbol: "socket".to_string(),
        }
    })?;
    let ptr = resolve_next(symbol)?;
    debug!("Resolved genuine socket() at {:p}", ptr);

    // dlsym returned the address of a function with the C socket() signature
    Ok(unsafe { std::mem::transmute::<*mut c_void, SocketFn>(ptr.as_ptr()) })
}

/// Resolve and cache the genuine `socket()`, terminating the process on failure
///
/// Whichever path resolves first (constructor or an early `socket()` call)
/// also installs the diagnostic subscriber.
pub fn install() -> SocketFn {
    *GENUINE_SOCKET.get_or_init(|| {
        observability::init_diagnostics();
        match resolve() {
            Ok(f) => f,
            Err(e) => fatal(e),
        }
    })
}

/// The cached genuine `socket()`, resolving it first if needed
pub fn genuine_socket() -> SocketFn {
    match GENUINE_SOCKET.get() {
        Some(f) => *f,
        None => install(),
    }
}

fn fatal(err: ShimError) -> ! {
    error!("{}", err);
    std::process::exit(1)
}
