use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::FixError;

/// Cooperative cancellation flag shared between a caller and a fix computation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// # Errors
    ///
    /// Returns [`FixError::Cancelled`] once [`CancellationToken::cancel`] was called
    /// on this token or any clone of it.
    pub fn check(&self) -> Result<(), FixError> {
        if self.is_cancelled() {
            Err(FixError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());
        clone.cancel();
        assert_eq!(token.check(), Err(FixError::Cancelled));
    }
}
