use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use parking_lot::Mutex;
use tracing::trace;

use crate::{
    error::StepError,
    signal::{Completion, CompletionSignal, Outcome},
};

/// Shared state of one `when_all` batch.
struct Gather {
    remaining: AtomicUsize,
    first_error: Mutex<Option<StepError>>,
    signal: CompletionSignal,
}

impl Gather {
    fn observe(&self, outcome: Outcome) {
        if let Err(err) = outcome {
            let mut first = self.first_error.lock();
            if first.is_none() {
                *first = Some(err);
            } else {
                trace!(error = %err, "discarding additional failure");
            }
        }

        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            let first = self.first_error.lock().take();
            let result = match first {
                Some(err) => self.signal.fail(err),
                None => self.signal.succeed(),
            };
            debug_assert!(result.is_ok(), "batch signal is written exactly once");
        }
    }
}

/// Combine several completions into one.
///
/// The returned completion resolves only after *every* input has resolved:
/// - with the first observed error if any input failed (later errors are dropped);
/// - with success otherwise.
///
/// An empty input resolves with success immediately.
pub fn when_all<I>(completions: I) -> Completion
where
    I: IntoIterator<Item = Completion>,
{
    let completions: Vec<Completion> = completions.into_iter().collect();
    let (signal, batch) = CompletionSignal::pair();

    if completions.is_empty() {
        let _ = signal.succeed();
        return batch;
    }

    let gather = Arc::new(Gather {
        remaining: AtomicUsize::new(completions.len()),
        first_error: Mutex::new(None),
        signal,
    });

    for completion in completions {
        let gather = Arc::clone(&gather);
        completion.on_complete(move |outcome| gather.observe(outcome));
    }
    batch
}
