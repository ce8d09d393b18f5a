//! Batch cancellation: shared abort tokens, one current batch at a time.
//!
//! Each batch obtains a fresh token from `BatchControl::begin`, which also
//! flips the previous batch's token so its in-flight validators stop at the
//! next check point. Validators hold read-only clones; the control is the
//! sole writer of the current token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared cancellation flag for one batch. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Issues one token per batch; starting a new batch supersedes the previous
/// one. The old batch's validators see their token flip and wind down while
/// the new batch proceeds without awaiting them.
#[derive(Debug, Default)]
pub struct BatchControl {
    current: Mutex<CancelToken>,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the token for a new batch, cancelling the previous batch's token.
    pub fn begin(&self) -> CancelToken {
        let mut current = self.current.lock().unwrap();
        current.cancel();
        *current = CancelToken::new();
        current.clone()
    }

    /// Cancel the current batch without starting a new one.
    pub fn cancel_current(&self) {
        self.current.lock().unwrap().cancel();
    }
}
