//! Async task runner on the tokio runtime.
//!
//! Each counter is a task in a [`JoinSet`]; waiting is `tokio::time::sleep`, so
//! a counter holds no thread while it waits. [`TaskRunner::run`] resolves once
//! every task has finished.
use std::collections::HashMap;

use tokio::{
    task::{Id, JoinSet},
    time,
};
use tracing::{debug, error, trace};

use tally_core::{CounterRun, Outcome, ProgressEvent, RunContext, RunnerKind, StepError};
use tally_model::CounterSpec;

/// Runner that counts in tokio tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskRunner {
    ctx: RunContext,
}

impl TaskRunner {
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx }
    }

    /// Spawn one task per spec and await all of them.
    ///
    /// Every task is awaited even after a failure. The result carries the
    /// first failure observed; a panicking task becomes [`StepError::Panicked`].
    ///
    /// Must be called from within a tokio runtime with the time driver enabled.
    pub async fn run<I>(&self, specs: I) -> Outcome
    where
        I: IntoIterator<Item = CounterSpec>,
    {
        let mut set = JoinSet::new();
        let mut names: HashMap<Id, String> = HashMap::new();

        for spec in specs {
            let run = CounterRun::new(RunnerKind::Task, spec);
            let name = run.spec().name().to_string();
            let ctx = self.ctx.clone();

            let handle = set.spawn(async move { count_async(&ctx, &run).await });
            debug!(counter = %name, task = %handle.id(), "counter task spawned");
            names.insert(handle.id(), name);
        }

        let mut first_error: Option<StepError> = None;
        while let Some(joined) = set.join_next().await {
            let res = match joined {
                Ok(res) => res,
                Err(e) => {
                    let counter = names.remove(&e.id()).unwrap_or_default();
                    let reason = if e.is_panic() {
                        tally_core::error::panic_reason(e.into_panic().as_ref())
                    } else {
                        e.to_string()
                    };
                    error!(counter = %counter, %reason, "counter task did not finish");
                    Err(StepError::Panicked { counter, reason })
                }
            };
            if let Err(e) = res {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Count `0..=max_count`, sleeping asynchronously before each step.
async fn count_async(ctx: &RunContext, run: &CounterRun) -> Outcome {
    let spec = run.spec();
    trace!(run = %run.id(), %spec, "counter task running");
    let _ = ctx.report(run, ProgressEvent::Started);

    for step in 0..=spec.max_count() {
        time::sleep(spec.delay()).await;
        if let Err(e) = ctx.report(run, ProgressEvent::Step { step }) {
            return Err(ctx.report_failure(run, e));
        }
    }

    let _ = ctx.report(run, ProgressEvent::Finished);
    Ok(())
}
