use thiserror::Error;

/// Failure of a single counting run.
///
/// This is the only error a counter can end with; it is what a failed
/// [`crate::CompletionSignal`] carries to its waiter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("counter '{counter}' failed at step {step}: {reason}")]
    Failed {
        counter: String,
        step: u64,
        reason: String,
    },

    #[error("counter '{counter}' panicked: {reason}")]
    Panicked { counter: String, reason: String },

    #[error("scheduler unavailable: {0}")]
    Scheduler(String),

    #[error("completion signal dropped before a terminal write")]
    Abandoned,
}

/// Misuse of a [`crate::CompletionSignal`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("completion signal already holds a terminal outcome")]
    AlreadyCompleted,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("step error: {0}")]
    Step(#[from] StepError),

    #[error("failed to spawn thread for counter '{counter}': {reason}")]
    ThreadSpawn { counter: String, reason: String },

    #[error("thread for counter '{counter}' panicked")]
    ThreadPanicked { counter: String },

    #[error("worker pool error: {0}")]
    Pool(String),
}

/// Render a panic payload as text.
pub fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
