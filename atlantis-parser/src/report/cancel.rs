//! Cooperative cancellation
//!
//! A [CancellationToken] is checked at the conversion's suspension points: every physical
//! line read and the final write of the document. Clones share the same flag, so a caller
//! can hand one clone to the conversion and cancel it from another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::report::error::ConvertError;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_at(Instant::now() + timeout)
    }

    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail if the token was cancelled or its deadline has passed.
    pub fn check(&self) -> Result<(), ConvertError> {
        if self.is_cancelled() {
            return Err(ConvertError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ConvertError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_cancellation() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(token.check().is_ok());
        handle.cancel();
        assert!(matches!(token.check(), Err(ConvertError::Cancelled)));
    }

    #[test]
    fn test_expired_deadline() {
        let token = CancellationToken::new().deadline_at(Instant::now());
        assert!(matches!(token.check(), Err(ConvertError::DeadlineExceeded)));
    }

    #[test]
    fn test_generous_deadline() {
        let token = CancellationToken::with_timeout(Duration::from_secs(3600));
        assert!(token.check().is_ok());
    }
}
