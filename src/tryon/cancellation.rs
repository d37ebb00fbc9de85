//! Cooperative cancellation for in-flight operations.
//!
//! A [`CancellationToken`] is handed to every suspending call an operation makes.
//! Cancelling is a request, not a guarantee: the callee may keep running, but
//! whoever awaits [`CancellationToken::cancelled`] is woken and the orchestrator
//! ignores whatever the callee eventually returns.
//!
//! ```
//! use tryon::cancellation::CancellationToken;
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let token = CancellationToken::new();
//!     let waiter = token.clone();
//!     token.cancel();
//!     waiter.cancelled().await;
//!     assert!(waiter.is_cancelled());
//! });
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns `true` if this call flipped the flag.
    pub fn cancel(&self) -> bool {
        let first = !self.state.cancelled.swap(true, Ordering::SeqCst);
        if first {
            self.state.notify.notify_waiters();
        }
        first
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once the token is cancelled; immediately if it already is.
    pub async fn cancelled(&self) {
        loop {
            // Registered before the flag check so a concurrent cancel cannot be missed.
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// True when both handles refer to the same token.
    pub fn same_token(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_pending_waiter() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            true
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(token.cancel());
        assert!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.cancel());
        assert!(!token.cancel());
        token.cancelled().await;
    }

    #[test]
    fn clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.same_token(&clone));
        assert!(!token.same_token(&CancellationToken::new()));
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
