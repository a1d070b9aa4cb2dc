//! Live-instance accounting for grids.
//!
//! Every `RealGrid` and `ComplexGrid` carries a [`LiveToken`] that bumps a
//! process-wide counter for its kind when created (or cloned) and decrements
//! it when dropped. A finished pipeline must leave both counters where it
//! found them. The counters are instrumentation only: nothing in the engine
//! reads them to make decisions.

use std::sync::atomic::{AtomicIsize, Ordering};

static LIVE_REAL: AtomicIsize = AtomicIsize::new(0);
static LIVE_COMPLEX: AtomicIsize = AtomicIsize::new(0);

/// Kind of grid tracked by the live-instance counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridKind {
    Real,
    Complex,
}

impl GridKind {
    fn counter(self) -> &'static AtomicIsize {
        match self {
            Self::Real => &LIVE_REAL,
            Self::Complex => &LIVE_COMPLEX,
        }
    }
}

impl std::fmt::Display for GridKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

/// Number of grids of `kind` currently alive in this process.
pub fn live_count(kind: GridKind) -> isize {
    kind.counter().load(Ordering::SeqCst)
}

/// Snapshot of both counters, `(real, complex)`.
pub fn live_counts() -> (isize, isize) {
    (live_count(GridKind::Real), live_count(GridKind::Complex))
}

/// Reset both counters to zero.
///
/// Only meaningful for test isolation when no grids are alive; resetting while
/// grids exist makes the counters go negative once those grids are dropped.
pub fn reset_live_counts() {
    LIVE_REAL.store(0, Ordering::SeqCst);
    LIVE_COMPLEX.store(0, Ordering::SeqCst);
}

/// Ownership marker embedded in each grid.
#[derive(Debug)]
pub(crate) struct LiveToken {
    kind: GridKind,
}

impl LiveToken {
    pub(crate) fn new(kind: GridKind) -> Self {
        kind.counter().fetch_add(1, Ordering::SeqCst);
        Self { kind }
    }
}

impl Clone for LiveToken {
    fn clone(&self) -> Self {
        Self::new(self.kind)
    }
}

impl Drop for LiveToken {
    fn drop(&mut self) {
        self.kind.counter().fetch_sub(1, Ordering::SeqCst);
    }
}
