//! One-shot guard for connection teardown.
//!
//! A connection can be closed explicitly (`disconnect`) or implicitly when its owner
//! is dropped. Both paths go through [`CloseOnce::fire`], so the teardown work runs
//! at most once per connection no matter how many paths reach it.

use std::sync::atomic::{AtomicBool, Ordering};

/// Armed when a connection opens, fired exactly once when it closes.
#[derive(Debug, Default)]
pub struct CloseOnce {
    armed: AtomicBool,
}

impl CloseOnce {
    /// A disarmed guard (nothing to close yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a freshly opened connection as needing teardown.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Returns `true` for the single caller that should perform the teardown.
    pub fn fire(&self) -> bool {
        self.armed.swap(false, Ordering::SeqCst)
    }

    /// Whether a teardown is still pending.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}
