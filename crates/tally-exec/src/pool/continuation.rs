//! Counting state machine driven by timer callbacks.
//!
//! A [`Continuation`] owns one counting run. Each entry runs exactly one
//! step on a pool worker, then moves the whole continuation into a sleeping
//! timer task and returns; when the delay elapses that task re-submits it to
//! the pool. No worker is ever parked while a counter waits.
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::Duration,
};

use rayon::ThreadPool;
use tokio::time;
use tracing::{trace, warn};

use tally_core::{
    CompletionSignal, CounterRun, ProgressEvent, RunContext, StepError, error::panic_reason,
};

use crate::pool::TimerRuntime;

/// Where a run stands between two entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CountState {
    /// Step `n` is next to be counted.
    Counting(u64),
    /// Step `n` was counted; waiting for its delay to elapse.
    Waiting(u64),
    Done,
    Failed,
}

/// What to do after one entry.
enum Next {
    Sleep(Duration),
    Finish,
    Fail(StepError),
    Idle,
}

pub(crate) struct Continuation {
    run: CounterRun,
    state: CountState,
    signal: CompletionSignal,
    ctx: RunContext,
    pool: Arc<ThreadPool>,
    timer: Arc<TimerRuntime>,
}

impl Continuation {
    pub(crate) fn new(
        run: CounterRun,
        signal: CompletionSignal,
        ctx: RunContext,
        pool: Arc<ThreadPool>,
        timer: Arc<TimerRuntime>,
    ) -> Self {
        Self {
            run,
            state: CountState::Counting(0),
            signal,
            ctx,
            pool,
            timer,
        }
    }

    /// Submit the first entry to the pool.
    pub(crate) fn submit(self) {
        let pool = Arc::clone(&self.pool);
        pool.spawn(move || {
            let _ = self.ctx.report(&self.run, ProgressEvent::Started);
            self.resume();
        });
    }

    /// One entry: advance the state machine, then suspend or terminate.
    fn resume(mut self) {
        let next = match panic::catch_unwind(AssertUnwindSafe(|| self.advance())) {
            Ok(next) => next,
            Err(payload) => Next::Fail(self.run.panicked(panic_reason(payload.as_ref()))),
        };

        match next {
            Next::Sleep(delay) => self.suspend(delay),
            Next::Finish => self.finish(),
            Next::Fail(err) => self.abort(err),
            Next::Idle => trace!(run = %self.run.id(), state = ?self.state, "nothing to resume"),
        }
    }

    fn advance(&mut self) -> Next {
        if let CountState::Waiting(step) = self.state {
            if let Err(e) = self.ctx.report(&self.run, ProgressEvent::Resumed { step }) {
                return Next::Fail(e);
            }
            self.state = match step.checked_add(1) {
                Some(next) => CountState::Counting(next),
                None => return Next::Finish,
            };
        }

        let spec = self.run.spec();
        match self.state {
            CountState::Counting(step) if step <= spec.max_count() => {
                if let Err(e) = self.ctx.report(&self.run, ProgressEvent::Step { step }) {
                    return Next::Fail(e);
                }
                self.state = CountState::Waiting(step);
                Next::Sleep(spec.delay())
            }
            CountState::Counting(_) => Next::Finish,
            CountState::Waiting(_) | CountState::Done | CountState::Failed => Next::Idle,
        }
    }

    /// Park the continuation in a timer task; it re-enters on a pool worker.
    ///
    /// The parked continuation holds its own handle to the timer runtime, so
    /// the runtime outlives every run that is still waiting on it.
    fn suspend(self, delay: Duration) {
        let timer = Arc::clone(&self.timer);
        timer.handle().spawn(async move {
            time::sleep(delay).await;
            let pool = Arc::clone(&self.pool);
            pool.spawn(move || self.resume());
        });
    }

    fn finish(mut self) {
        self.state = CountState::Done;
        let _ = self.ctx.report(&self.run, ProgressEvent::Finished);
        if self.signal.succeed().is_err() {
            warn!(run = %self.run.id(), "completion signal was already written");
        }
    }

    fn abort(mut self, err: StepError) {
        self.state = CountState::Failed;
        let err = self.ctx.report_failure(&self.run, err);
        if self.signal.fail(err).is_err() {
            warn!(run = %self.run.id(), "completion signal was already written");
        }
    }
}

impl Drop for Continuation {
    // A continuation dropped mid-run (timer task torn down, panic outside
    // `advance`) still owes its waiter a terminal outcome.
    fn drop(&mut self) {
        if matches!(self.state, CountState::Counting(_) | CountState::Waiting(_)) {
            let err = StepError::Scheduler(format!(
                "counter '{}' dropped before completion",
                self.run.spec().name()
            ));
            let _ = self.signal.fail(self.ctx.report_failure(&self.run, err));
        }
    }
}
