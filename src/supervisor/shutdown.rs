//! Process-wide cancellation signal
//!
//! One [`ShutdownController`] (held by the supervisor) and any number of
//! [`ShutdownListener`]s (one per worker). The signal moves from active to
//! cancelled exactly once and never back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Write side of the cancellation signal
#[derive(Debug, Default)]
pub struct ShutdownController {
    token: CancellationToken,
    fired: AtomicBool,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only handle for a worker
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            token: self.token.clone(),
        }
    }

    /// Broadcast cancellation. Returns `true` only for the call that performed
    /// the transition.
    pub fn cancel(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        info!("Broadcasting cancellation to all workers");
        self.token.cancel();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Read side of the cancellation signal
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    token: CancellationToken,
}

impl ShutdownListener {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Sleep that cancellation cuts short. Returns `true` if the full
    /// duration elapsed.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return !self.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
