//! Progress reporting for counting runs.
//!
//! Runners never print directly: every lifecycle point of a run is handed to a
//! [`ProgressSink`] injected through [`crate::RunContext`]. The default sink turns
//! events into `tracing` lines; tests plug in sinks that record or fail.
mod event;
pub use event::ProgressEvent;

mod noop;
pub use noop::NoopProgress;

mod tracing_sink;
pub use tracing_sink::TracingProgress;

use std::sync::Arc;

use crate::{error::StepError, runner::CounterRun};

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync + 'static {
    /// Record `event` for `run`.
    ///
    /// Returning an error from a [`ProgressEvent::Step`] or [`ProgressEvent::Resumed`]
    /// event fails that step: the run stops there and its outcome becomes that error.
    /// Errors returned for other events are ignored by the runners.
    fn record(&self, run: &CounterRun, event: &ProgressEvent) -> Result<(), StepError>;
}

/// Shared handle to a progress sink.
pub type ProgressHandle = Arc<dyn ProgressSink>;

/// Sink writing one `tracing` event per progress event.
#[inline]
pub fn tracing_progress() -> ProgressHandle {
    Arc::new(TracingProgress)
}
