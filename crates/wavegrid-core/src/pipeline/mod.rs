//! Staged pipelines over owned grids.
//!
//! A stage consumes its input grid and returns a new one. The driver hands
//! each stage's output to the next stage by move, so an intermediate grid is
//! dropped as soon as the stage that consumed it returns and at most the
//! stage's input and output are alive at once. On error or cancellation the
//! grid currently held is dropped before the error propagates.

mod cancel;

use tracing::debug;

use crate::error::Result;

pub use cancel::{CancelFn, Cancellation, NeverCancel};

type StageFn<'a, G> = Box<dyn FnMut(G) -> Result<G> + 'a>;

/// Ordered sequence of named stages over grids of type `G`.
pub struct Pipeline<'a, G> {
    stages: Vec<(String, StageFn<'a, G>)>,
}

impl<G> Default for Pipeline<'_, G> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<'a, G> Pipeline<'a, G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fallible stage.
    pub fn try_stage<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(G) -> Result<G> + 'a,
    {
        self.stages.push((name.into(), Box::new(f)));
        self
    }

    /// Append a stage that cannot fail.
    pub fn stage<F>(self, name: impl Into<String>, mut f: F) -> Self
    where
        F: FnMut(G) -> G + 'a,
    {
        self.try_stage(name, move |g| Ok(f(g)))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|(name, _)| name.as_str())
    }

    /// Feed `input` through every stage in order.
    ///
    /// `cancel` is polled before each stage; a cancelled run drops the grid
    /// in hand and returns `GridError::Cancelled`.
    pub fn run(&mut self, input: G, cancel: &dyn Cancellation) -> Result<G> {
        let mut current = input;
        for (index, (name, stage)) in self.stages.iter_mut().enumerate() {
            cancel.check()?;
            current = stage(current)?;
            debug!(stage = %name, index, "pipeline stage complete");
        }
        Ok(current)
    }
}
