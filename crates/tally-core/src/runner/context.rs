use std::fmt;

use crate::{
    error::StepError,
    progress::{ProgressEvent, ProgressHandle, tracing_progress},
    runner::CounterRun,
};

/// Shared context handed to every runner.
#[derive(Clone)]
pub struct RunContext {
    progress: ProgressHandle,
}

impl RunContext {
    pub fn new(progress: ProgressHandle) -> Self {
        Self { progress }
    }

    /// Replace the progress sink and return the updated context.
    pub fn with_progress(mut self, progress: ProgressHandle) -> Self {
        self.progress = progress;
        self
    }

    /// Forward `event` for `run` to the sink.
    #[inline]
    pub fn report(&self, run: &CounterRun, event: ProgressEvent) -> Result<(), StepError> {
        self.progress.record(run, &event)
    }

    /// Report `err` as a [`ProgressEvent::Failed`] event and hand it back.
    pub fn report_failure(&self, run: &CounterRun, err: StepError) -> StepError {
        let _ = self.report(
            run,
            ProgressEvent::Failed {
                reason: err.to_string(),
            },
        );
        err
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            progress: tracing_progress(),
        }
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("progress", &"<handle>")
            .finish()
    }
}
