use crate::{
    error::StepError,
    progress::{ProgressEvent, ProgressSink},
    runner::CounterRun,
};

/// Sink that accepts and drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    #[inline(always)]
    fn record(&self, _: &CounterRun, _: &ProgressEvent) -> Result<(), StepError> {
        Ok(())
    }
}
