//! How a watcher ends the process once its exit condition is met.
//!
//! Watchers hold an `Arc<dyn Terminate>` instead of calling
//! `std::process::exit` themselves, so a host that manages its own exit (or
//! a test) can observe the request without the process going away.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// The capability to terminate the host process.
pub trait Terminate: Send + Sync {
    /// Ends the process with `status`. Implementations that really exit
    /// never return.
    fn terminate(&self, status: i32);
}

/// Exits the current process immediately, without unwinding the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl Terminate for ProcessExit {
    fn terminate(&self, status: i32) {
        info!(status, "Exit condition met. Terminating process.");
        std::process::exit(status)
    }
}

/// Records termination requests instead of exiting.
///
/// Control returns to the caller after each request.
#[derive(Debug, Default)]
pub struct ExitLatch {
    requests: AtomicUsize,
    status: Mutex<Option<i32>>,
}

impl ExitLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of the first termination request, if any was made.
    pub fn requested(&self) -> Option<i32> {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_tripped(&self) -> bool {
        self.request_count() > 0
    }

    /// How many times termination has been requested.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Terminate for ExitLatch {
    fn terminate(&self, status: i32) {
        info!(status, "Exit condition met. Termination recorded.");
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(status);
    }
}
