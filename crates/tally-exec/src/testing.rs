//! Progress sinks used by runner tests.
use std::sync::Arc;

use parking_lot::Mutex;
use tally_core::{CounterRun, ProgressEvent, ProgressSink, RunContext, StepError};
use tally_model::CounterSpec;

/// Records every accepted event; optionally fails one step of one counter.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<(String, ProgressEvent)>>,
    fail_at: Option<(String, u64)>,
    panic_at: Option<(String, u64)>,
}

impl RecordingProgress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reject `Step { step }` of `counter`; the rejected step is not recorded.
    pub fn failing_at(counter: &str, step: u64) -> Arc<Self> {
        Arc::new(Self {
            fail_at: Some((counter.to_string(), step)),
            ..Default::default()
        })
    }

    /// Panic inside `Step { step }` of `counter`.
    pub fn panicking_at(counter: &str, step: u64) -> Arc<Self> {
        Arc::new(Self {
            panic_at: Some((counter.to_string(), step)),
            ..Default::default()
        })
    }

    pub fn context(self: &Arc<Self>) -> RunContext {
        RunContext::new(self.clone())
    }

    pub fn events_of(&self, counter: &str) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(name, _)| name == counter)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Steps counted by `counter`, in emission order.
    pub fn steps_of(&self, counter: &str) -> Vec<u64> {
        self.events_of(counter)
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Step { step } => Some(step),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn record(&self, run: &CounterRun, event: &ProgressEvent) -> Result<(), StepError> {
        let name = run.spec().name();
        if let ProgressEvent::Step { step } = event {
            if self.panic_at.as_ref().is_some_and(|(c, s)| c == name && s == step) {
                panic!("injected panic at step {step}");
            }
            if self.fail_at.as_ref().is_some_and(|(c, s)| c == name && s == step) {
                return Err(run.step_failed(*step, "injected failure"));
            }
        }
        self.events.lock().push((name.to_string(), event.clone()));
        Ok(())
    }
}

pub fn spec(name: &str, max_count: u64, delay_ms: u64) -> CounterSpec {
    CounterSpec::with_delay_ms(name, max_count, delay_ms).unwrap()
}
