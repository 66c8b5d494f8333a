//! Module to signal a fatal abort across kdsgen tasks.
//!
//! A kdsgen run is a single distributor feeding many accumulators. Any one of
//! those accumulators may hit an error that ends the run, and when that
//! happens every other task must stop promptly rather than continue to push
//! load into an endpoint whose run is already considered failed.
//!
//! The mechanism here has two components, a `Broadcaster` and a `Watcher`. Any
//! number of `Broadcaster` clones may fire the signal, only the first firing
//! has any effect. Any number of `Watcher` clones may wait for it. Once fired
//! the signal is never cleared.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions)]

#[cfg(not(loom))]
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[cfg(loom)]
use loom::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Notify;
use tracing::debug;

/// Construct a `Watcher` and `Broadcaster` pair.
#[must_use]
pub fn signal() -> (Watcher, Broadcaster) {
    let fired = Arc::new(AtomicBool::new(false));
    let notify = Arc::new(Notify::new());

    let w = Watcher {
        fired: Arc::clone(&fired),
        notify: Arc::clone(&notify),
    };
    let b = Broadcaster { fired, notify };

    (w, b)
}

#[derive(Debug, Clone)]
/// Mechanism to notify every `Watcher` that the run must abort.
pub struct Broadcaster {
    /// Set once, by whichever `Broadcaster` fires first.
    fired: Arc<AtomicBool>,
    /// Wakes `Watcher` instances parked in `recv`.
    notify: Arc<Notify>,
}

impl Broadcaster {
    /// Fire the abort signal.
    ///
    /// Returns true if this call was the one to fire the signal, false if the
    /// signal had already been fired. Function does not block.
    pub fn signal(&self) -> bool {
        let first = self
            .fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            debug!("abort signal fired");
            self.notify.notify_waiters();
        }
        first
    }
}

#[derive(Debug, Clone)]
/// Mechanism to watch for the abort signal.
pub struct Watcher {
    /// Shared with every `Broadcaster` of this pair.
    fired: Arc<AtomicBool>,
    /// Woken by the firing `Broadcaster`.
    notify: Arc<Notify>,
}

impl Watcher {
    /// Wait for the abort signal. Returns immediately if the signal has
    /// already been fired, and on every call after that.
    pub async fn recv(&self) {
        loop {
            // Register for notification before checking the flag. If we
            // checked first a broadcaster could fire between the check and the
            // registration and we would park forever.
            let notified = self.notify.notified();

            if self.fired.load(Ordering::SeqCst) {
                return;
            }

            notified.await;
        }
    }

    /// Check whether the abort signal has been fired without blocking.
    #[must_use]
    pub fn try_recv(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}
