//! Suppression of asynchronous interruption while measurements run.
//!
//! [`QuiesceGuard`] masks every blockable signal for the calling thread and
//! restores the previous mask on drop, so one guard can cover all phases of
//! a run no matter how the scope is exited.
//!
//! `SIGKILL` and `SIGSTOP` cannot be masked. If the thread is torn down
//! forcibly while the guard is live, the saved mask dies with it and nothing
//! here can restore it. That is an inherent property of quiescing the thread
//! itself, documented rather than worked around.

use std::io;
use std::mem::MaybeUninit;
use std::ptr;

use tracing::warn;

/// Blocks signal delivery to the calling thread until dropped.
pub struct QuiesceGuard {
    saved: libc::sigset_t,
}

impl QuiesceGuard {
    /// Mask all blockable signals, remembering the mask in effect before.
    pub fn engage() -> io::Result<QuiesceGuard> {
        unsafe {
            let mut all = MaybeUninit::<libc::sigset_t>::uninit();
            if libc::sigfillset(all.as_mut_ptr()) != 0 {
                return Err(io::Error::last_os_error());
            }

            let mut saved = MaybeUninit::<libc::sigset_t>::uninit();
            let rc = libc::pthread_sigmask(libc::SIG_SETMASK, all.as_ptr(), saved.as_mut_ptr());
            if rc != 0 {
                return Err(io::Error::from_raw_os_error(rc));
            }

            Ok(QuiesceGuard {
                saved: saved.assume_init(),
            })
        }
    }
}

impl Drop for QuiesceGuard {
    fn drop(&mut self) {
        let rc = unsafe { libc::pthread_sigmask(libc::SIG_SETMASK, &self.saved, ptr::null_mut()) };
        if rc != 0 {
            warn!(
                "failed to restore signal mask: {}",
                io::Error::from_raw_os_error(rc)
            );
        }
    }
}
