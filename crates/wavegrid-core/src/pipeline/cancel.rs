use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{GridError, Result};

/// Caller-supplied check polled by long-running operations.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;

    /// `Err(GridError::Cancelled)` once cancellation has been signalled.
    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(GridError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Check that never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Adapts a closure into a [`Cancellation`] check.
pub struct CancelFn<F>(pub F);

impl<F> Cancellation for CancelFn<F>
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        (self.0)()
    }
}
