//! Ctrl-C handling for long scans.
//!
//! While installed, SIGINT only raises a flag. The scanner checks it between
//! files, so an interrupted scan still reports what it found so far.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigint(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT to the returned stop flag instead of terminating the process.
#[cfg(unix)]
pub fn install() -> &'static AtomicBool {
    INTERRUPTED.store(false, Ordering::SeqCst);
    let handler = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
    unsafe {
        libc::signal(libc::SIGINT, handler);
    }
    &INTERRUPTED
}

/// Restore the default SIGINT behavior.
#[cfg(unix)]
pub fn restore() {
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
pub fn install() -> &'static AtomicBool {
    INTERRUPTED.store(false, Ordering::SeqCst);
    &INTERRUPTED
}

#[cfg(not(unix))]
pub fn restore() {}
