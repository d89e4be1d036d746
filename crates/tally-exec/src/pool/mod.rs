//! Worker-pool runner with hand-built continuations.
//!
//! Counting work is submitted to a shared `rayon` pool. A run never blocks a
//! worker: after each step it parks itself in a tokio timer task and returns,
//! and the task re-submits the next step to the pool once the delay elapsed.
//! Each run reports through its own [`CompletionSignal`]; [`PoolRunner::run`]
//! folds them into one batch [`Completion`] with [`when_all`].
mod config;
mod continuation;

pub use config::PoolConfig;

use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, error, info};

use tally_core::{
    Completion, CompletionSignal, CoreError, CounterRun, RunContext, RunnerKind, error::panic_reason,
    when_all,
};
use tally_model::CounterSpec;

use crate::{ExecError, pool::continuation::Continuation};

/// Time-driver-only runtime that hosts the sleeping continuations.
///
/// Shared by the runner and every parked continuation; it shuts down when the
/// last of them lets go.
pub(crate) struct TimerRuntime {
    handle: Handle,
    rt: Option<Runtime>,
}

impl TimerRuntime {
    fn start(name: String) -> std::io::Result<Self> {
        let rt = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(name)
            .enable_time()
            .build()?;
        Ok(Self {
            handle: rt.handle().clone(),
            rt: Some(rt),
        })
    }

    pub(crate) fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for TimerRuntime {
    // The last handle may go away on a runtime thread; a blocking shutdown would panic there.
    fn drop(&mut self) {
        if let Some(rt) = self.rt.take() {
            rt.shutdown_background();
        }
    }
}

/// Runner that counts on a shared worker pool.
///
/// Dropping the runner does not cancel started runs: each one keeps the pool
/// and the timer alive until it completes.
pub struct PoolRunner {
    pool: Arc<ThreadPool>,
    timer: Arc<TimerRuntime>,
    ctx: RunContext,
}

impl PoolRunner {
    /// Build the worker pool and start the timer runtime.
    pub fn new(cfg: &PoolConfig, ctx: RunContext) -> Result<Self, ExecError> {
        cfg.validate()?;

        let prefix = cfg.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(cfg.workers)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .panic_handler(|payload| {
                error!(reason = %panic_reason(payload.as_ref()), "pool job panicked");
            })
            .build()
            .map_err(|e| CoreError::Pool(e.to_string()))?;

        let timer = TimerRuntime::start(format!("{}-timer", cfg.thread_name_prefix))?;

        debug!(workers = pool.current_num_threads(), "worker pool ready");
        Ok(Self {
            pool: Arc::new(pool),
            timer: Arc::new(timer),
            ctx,
        })
    }

    /// Number of worker threads in the pool.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Start one counting run and return its completion.
    ///
    /// Returns immediately; the run proceeds on the pool.
    pub fn start(&self, spec: CounterSpec) -> Completion {
        let (signal, completion) = CompletionSignal::pair();
        let run = CounterRun::new(RunnerKind::Pool, spec);
        debug!(run = %run.id(), "submitting counter to pool");

        Continuation::new(
            run,
            signal,
            self.ctx.clone(),
            Arc::clone(&self.pool),
            Arc::clone(&self.timer),
        )
        .submit();
        completion
    }

    /// Start every spec and return one completion for the whole batch.
    ///
    /// The batch fails with the first observed error if any run fails,
    /// and succeeds once every run has succeeded.
    pub fn run<I>(&self, specs: I) -> Completion
    where
        I: IntoIterator<Item = CounterSpec>,
    {
        let runs: Vec<Completion> = specs.into_iter().map(|spec| self.start(spec)).collect();
        let total = runs.len();

        let (signal, batch) = CompletionSignal::pair();
        when_all(runs).on_complete(move |outcome| {
            match &outcome {
                Ok(()) => info!(counters = total, "all tasks completed"),
                Err(e) => error!(counters = total, error = %e, "task batch failed"),
            }
            let _ = signal.complete(outcome);
        });
        batch
    }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::testing::{RecordingProgress, spec};
    use tally_core::{ProgressEvent, StepError};

    const WAIT: Duration = Duration::from_secs(5);

    fn runner(sink: &Arc<RecordingProgress>, workers: usize) -> PoolRunner {
        PoolRunner::new(&PoolConfig::default().with_workers(workers), sink.context()).unwrap()
    }

    fn wait(c: Completion) -> tally_core::Outcome {
        c.wait_timeout(WAIT).expect("completion should resolve in time")
    }

    #[test]
    fn single_counter_counts_then_succeeds() {
        let sink = RecordingProgress::new();
        let runner = runner(&sink, 2);
        let started = Instant::now();

        let outcome = wait(runner.start(spec("A", 2, 10)));
        let elapsed = started.elapsed();

        assert_eq!(outcome, Ok(()));
        assert_eq!(sink.steps_of("A"), vec![0, 1, 2]);
        assert!(elapsed >= Duration::from_millis(20), "too fast: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(200), "too slow: {elapsed:?}");
    }

    #[test]
    fn emits_resume_between_steps() {
        let sink = RecordingProgress::new();
        let outcome = wait(runner(&sink, 1).start(spec("A", 1, 1)));

        assert_eq!(outcome, Ok(()));
        assert_eq!(
            sink.events_of("A"),
            vec![
                ProgressEvent::Started,
                ProgressEvent::Step { step: 0 },
                ProgressEvent::Resumed { step: 0 },
                ProgressEvent::Step { step: 1 },
                ProgressEvent::Resumed { step: 1 },
                ProgressEvent::Finished,
            ]
        );
    }

    #[test]
    fn counters_do_not_block_a_single_worker() {
        // With one worker and blocking sleeps, four 40ms counters would need >= 4 * 80ms.
        let sink = RecordingProgress::new();
        let runner = runner(&sink, 1);
        let started = Instant::now();

        let specs = (0..4).map(|i| spec(&format!("C{i}"), 1, 40));
        assert_eq!(wait(runner.run(specs)), Ok(()));

        assert!(started.elapsed() < Duration::from_millis(250));
        for i in 0..4 {
            assert_eq!(sink.steps_of(&format!("C{i}")), vec![0, 1]);
        }
    }

    #[test]
    fn batch_succeeds_when_every_run_succeeds() {
        let sink = RecordingProgress::new();
        let outcome = wait(runner(&sink, 2).run([spec("A", 4, 3), spec("B", 8, 2), spec("Z", 0, 0)]));

        assert_eq!(outcome, Ok(()));
        assert_eq!(sink.steps_of("A"), (0..=4).collect::<Vec<_>>());
        assert_eq!(sink.steps_of("B"), (0..=8).collect::<Vec<_>>());
        assert_eq!(sink.steps_of("Z"), vec![0]);
    }

    #[test]
    fn failure_on_first_step_fails_signal_without_further_steps() {
        let sink = RecordingProgress::failing_at("bad", 0);
        let outcome = wait(runner(&sink, 2).start(spec("bad", 3, 1)));

        assert_eq!(
            outcome,
            Err(StepError::Failed {
                counter: "bad".into(),
                step: 0,
                reason: "injected failure".into(),
            })
        );
        assert!(sink.steps_of("bad").is_empty());
        assert!(matches!(
            sink.events_of("bad").as_slice(),
            [ProgressEvent::Started, ProgressEvent::Failed { .. }]
        ));

        // Nothing resumes later.
        thread::sleep(Duration::from_millis(20));
        assert!(sink.steps_of("bad").is_empty());
    }

    #[test]
    fn batch_fails_if_one_run_fails_and_siblings_finish() {
        let sink = RecordingProgress::failing_at("bad", 1);
        let outcome = wait(runner(&sink, 2).run([spec("good", 3, 2), spec("bad", 3, 2)]));

        assert!(matches!(
            outcome,
            Err(StepError::Failed { ref counter, step: 1, .. }) if counter == "bad"
        ));
        assert_eq!(sink.steps_of("bad"), vec![0]);
        assert_eq!(sink.steps_of("good"), vec![0, 1, 2, 3]);
        assert_eq!(sink.events_of("good").last(), Some(&ProgressEvent::Finished));
    }

    #[test]
    fn panic_in_step_becomes_failure() {
        let sink = RecordingProgress::panicking_at("boom", 1);
        let outcome = wait(runner(&sink, 1).start(spec("boom", 2, 0)));

        match outcome {
            Err(StepError::Panicked { counter, reason }) => {
                assert_eq!(counter, "boom");
                assert!(reason.contains("injected panic"), "unexpected reason {reason}");
            }
            other => panic!("expected panic failure, got {other:?}"),
        }
        assert_eq!(sink.steps_of("boom"), vec![0]);
    }

    #[test]
    fn dropping_runner_lets_started_runs_finish() {
        let sink = RecordingProgress::new();
        let completion = {
            let runner = runner(&sink, 1);
            runner.start(spec("A", 2, 10))
        };

        assert_eq!(wait(completion), Ok(()));
        assert_eq!(sink.steps_of("A"), vec![0, 1, 2]);
        assert_eq!(sink.events_of("A").last(), Some(&ProgressEvent::Finished));
    }

    #[test]
    fn dropping_runner_mid_delay_keeps_waiting_run() {
        let sink = RecordingProgress::new();
        let runner = runner(&sink, 1);
        let completion = runner.start(spec("slow", 1, 40));

        // Step 0 has run and the counter is parked in its delay.
        thread::sleep(Duration::from_millis(15));
        drop(runner);

        assert_eq!(wait(completion), Ok(()));
        assert_eq!(sink.steps_of("slow"), vec![0, 1]);
    }

    #[test]
    fn empty_batch_succeeds() {
        let sink = RecordingProgress::new();
        assert_eq!(wait(runner(&sink, 1).run(Vec::new())), Ok(()));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = PoolConfig {
            thread_name_prefix: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            PoolRunner::new(&cfg, RunContext::default()),
            Err(ExecError::InvalidRunnerConfig(_))
        ));
    }

    #[test]
    fn worker_count_follows_config() {
        let sink = RecordingProgress::new();
        assert_eq!(runner(&sink, 3).workers(), 3);
    }
}
