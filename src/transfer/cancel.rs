//! Cooperative cancellation
//!
//! The orchestrator polls the signal at the top of every page and every
//! record; work for the current record always finishes first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Cancellation flag shared between a running job and whoever may stop it
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Cancel the returned signal on Ctrl-C
pub fn cancel_on_ctrl_c() -> CancelSignal {
    let signal = CancelSignal::new();
    let flag = signal.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping at the next record boundary");
            flag.cancel();
        }
    });

    signal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let signal = CancelSignal::new();
        let other = signal.clone();
        assert!(!signal.is_cancelled());

        other.cancel();
        assert!(signal.is_cancelled());
        assert!(other.is_cancelled());
    }
}
