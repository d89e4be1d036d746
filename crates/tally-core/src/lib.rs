pub mod error;
pub mod progress;
pub mod runner;
pub mod signal;

pub use error::{CoreError, SignalError, StepError};
pub use progress::{NoopProgress, ProgressEvent, ProgressHandle, ProgressSink, TracingProgress};
pub use runner::{CounterRun, RunContext, RunnerKind};
pub use signal::{Completion, CompletionSignal, Outcome, when_all};
