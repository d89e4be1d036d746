//! Dedicated-thread runner.
//!
//! Every counter gets its own OS thread which blocks in `thread::sleep` before
//! each step. The caller blocks until all threads are joined, so no run can be
//! cut short by the caller returning early.
use std::thread::{self, JoinHandle};

use tracing::{debug, trace};

use tally_core::{CoreError, CounterRun, ProgressEvent, RunContext, RunnerKind, StepError};
use tally_model::CounterSpec;

/// Runner with one OS thread per counter.
#[derive(Debug, Clone, Default)]
pub struct ThreadRunner {
    ctx: RunContext,
}

impl ThreadRunner {
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx }
    }

    /// Count every spec on its own thread and join them all.
    ///
    /// All spawned threads are joined even when some of them fail. The first
    /// failure (in spawn order) is returned: a rejected step, a panicked thread
    /// or a thread that could not be spawned.
    pub fn run<I>(&self, specs: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = CounterSpec>,
    {
        let mut first_error: Option<CoreError> = None;
        let mut handles: Vec<(String, JoinHandle<Result<(), StepError>>)> = Vec::new();

        for spec in specs {
            let name = spec.name().to_string();
            match self.spawn(spec) {
                Ok(handle) => handles.push((name, handle)),
                Err(e) => {
                    debug!(counter = %name, error = %e, "failed to spawn counter thread");
                    first_error.get_or_insert(e);
                    break;
                }
            }
        }

        for (name, handle) in handles {
            let res = match handle.join() {
                Ok(Ok(())) => Ok(()),
                Ok(Err(step)) => Err(CoreError::Step(step)),
                Err(_) => Err(CoreError::ThreadPanicked { counter: name }),
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

    fn spawn(&self, spec: CounterSpec) -> Result<JoinHandle<Result<(), StepError>>, CoreError> {
        let run = CounterRun::new(RunnerKind::Thread, spec);
        let ctx = self.ctx.clone();
        let name = run.spec().name().to_string();

        thread::Builder::new()
            .name(format!("counter:{name}"))
            .spawn(move || count_blocking(&ctx, &run))
            .map_err(|e| CoreError::ThreadSpawn {
                counter: name,
                reason: e.to_string(),
            })
    }
}

/// Count `0..=max_count` on the current thread, sleeping before each step.
fn count_blocking(ctx: &RunContext, run: &CounterRun) -> Result<(), StepError> {
    let spec = run.spec();
    trace!(run = %run.id(), %spec, "counter thread running");
    let _ = ctx.report(run, ProgressEvent::Started);

    for step in 0..=spec.max_count() {
        thread::sleep(spec.delay());
        if let Err(e) = ctx.report(run, ProgressEvent::Step { step }) {
            return Err(ctx.report_failure(run, e));
        }
    }

    let _ = ctx.report(run, ProgressEvent::Finished);
    Ok(())
}
