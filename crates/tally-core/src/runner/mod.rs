//! Shared pieces used by every runner in `tally-exec`.
//!
//! A runner turns [`CounterSpec`]s into counting runs on some execution model
//! (dedicated threads, a worker pool, async tasks). Each run is described by a
//! [`CounterRun`] and reports through the [`RunContext`] it was given.
mod context;
pub use context::RunContext;

mod id;
pub use id::make_run_id;

use std::fmt;

use tally_model::CounterSpec;

use crate::error::StepError;

/// Execution model a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerKind {
    /// One dedicated OS thread per counter, blocking sleep between steps.
    Thread,
    /// Shared worker pool, timer callbacks re-submit the next step.
    Pool,
    /// Async tasks suspended at `.await` points.
    Task,
}

impl RunnerKind {
    /// Label used in logs and run ids.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerKind::Thread => "thread",
            RunnerKind::Pool => "pool",
            RunnerKind::Task => "task",
        }
    }
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One counting run: the descriptor plus who runs it.
#[derive(Debug, Clone)]
pub struct CounterRun {
    runner: RunnerKind,
    id: String,
    spec: CounterSpec,
}

impl CounterRun {
    /// Create a run with a fresh run id.
    pub fn new(runner: RunnerKind, spec: CounterSpec) -> Self {
        Self {
            id: make_run_id(runner.as_label(), spec.name()),
            runner,
            spec,
        }
    }

    #[inline]
    pub fn runner(&self) -> RunnerKind {
        self.runner
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn spec(&self) -> &CounterSpec {
        &self.spec
    }

    /// Build the error for a step that failed with `reason`.
    pub fn step_failed(&self, step: u64, reason: impl Into<String>) -> StepError {
        StepError::Failed {
            counter: self.spec.name().to_string(),
            step,
            reason: reason.into(),
        }
    }

    /// Build the error for a panic caught at the run boundary.
    pub fn panicked(&self, reason: impl Into<String>) -> StepError {
        StepError::Panicked {
            counter: self.spec.name().to_string(),
            reason: reason.into(),
        }
    }
}
