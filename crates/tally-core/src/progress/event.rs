use std::fmt;

/// Lifecycle point of a counting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The run was picked up by its execution context.
    Started,
    /// Step `step` was counted.
    Step { step: u64 },
    /// The delay after step `step` elapsed and the run re-entered.
    ///
    /// Only emitted by runners that suspend without a parked context.
    Resumed { step: u64 },
    /// All steps were counted.
    Finished,
    /// The run stopped early.
    Failed { reason: String },
}

impl ProgressEvent {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ProgressEvent::Started => "started",
            ProgressEvent::Step { .. } => "step",
            ProgressEvent::Resumed { .. } => "resumed",
            ProgressEvent::Finished => "finished",
            ProgressEvent::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Step { step } | ProgressEvent::Resumed { step } => {
                write!(f, "{}({step})", self.as_label())
            }
            ProgressEvent::Failed { reason } => write!(f, "failed({reason})"),
            other => f.write_str(other.as_label()),
        }
    }
}
