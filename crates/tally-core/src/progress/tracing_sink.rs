use tracing::{debug, error, info};

use crate::{
    error::StepError,
    progress::{ProgressEvent, ProgressSink},
    runner::CounterRun,
};

/// Sink that logs every event through `tracing`.
///
/// Levels: `Failed` at ERROR, `Resumed` at DEBUG, everything else at INFO.
/// Fields: `runner`, `run`, `counter`, and `step`/`max` where they apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn record(&self, run: &CounterRun, event: &ProgressEvent) -> Result<(), StepError> {
        let runner = run.runner().as_label();
        let counter = run.spec().name();
        let max = run.spec().max_count();

        match event {
            ProgressEvent::Started => {
                info!(runner, run = %run.id(), counter, "{counter}: started")
            }
            ProgressEvent::Step { step } => info!(
                runner,
                run = %run.id(),
                counter,
                step,
                max,
                "{counter} has counted {step} / {max}"
            ),
            ProgressEvent::Resumed { step } => debug!(
                runner,
                run = %run.id(),
                counter,
                step,
                "{counter} resuming after delay"
            ),
            ProgressEvent::Finished => {
                info!(runner, run = %run.id(), counter, "{counter} has completed the count")
            }
            ProgressEvent::Failed { reason } => {
                error!(runner, run = %run.id(), counter, reason = %reason, "{counter} failed")
            }
        }
        Ok(())
    }
}
