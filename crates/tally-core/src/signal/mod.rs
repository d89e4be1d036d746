//! Single-write completion signals.
//!
//! A [`CompletionSignal`] is the writing half: it receives exactly one terminal
//! outcome (success or a [`StepError`]). A [`Completion`] is the reading half: it
//! is consumed once, either by blocking in [`Completion::wait`] or by handing it
//! a callback with [`Completion::on_complete`].
//!
//! The pair replaces a blocking return value for work that finishes on some
//! other thread, at some later time, through a chain of callbacks.
mod aggregate;
pub use aggregate::when_all;

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use crate::error::{SignalError, StepError};

/// Terminal outcome of a counting run.
pub type Outcome = Result<(), StepError>;

type Callback = Box<dyn FnOnce(Outcome) + Send + 'static>;

enum State {
    Pending(Option<Callback>),
    Done(Option<Outcome>),
}

struct Shared {
    state: Mutex<State>,
    ready: Condvar,
}

/// Writing half of a completion signal.
///
/// Dropping a signal that never received a terminal write resolves it with
/// [`StepError::Abandoned`], so a waiter can never hang on a lost writer.
pub struct CompletionSignal {
    shared: Arc<Shared>,
}

/// Reading half of a completion signal. Observed exactly once.
#[must_use = "a completion does nothing unless waited on or given a callback"]
pub struct Completion {
    shared: Arc<Shared>,
}

impl CompletionSignal {
    /// Create a connected writer/waiter pair.
    pub fn pair() -> (CompletionSignal, Completion) {
        let shared = Arc::new(Shared {
            state: Mutex::new(State::Pending(None)),
            ready: Condvar::new(),
        });
        (
            CompletionSignal {
                shared: Arc::clone(&shared),
            },
            Completion { shared },
        )
    }

    /// Mark the run as succeeded.
    pub fn succeed(&self) -> Result<(), SignalError> {
        self.complete(Ok(()))
    }

    /// Mark the run as failed with `err`.
    pub fn fail(&self, err: StepError) -> Result<(), SignalError> {
        self.complete(Err(err))
    }

    /// Write the terminal outcome.
    ///
    /// Returns [`SignalError::AlreadyCompleted`] on any write after the first;
    /// the stored outcome is left untouched.
    pub fn complete(&self, outcome: Outcome) -> Result<(), SignalError> {
        let deliver = {
            let mut state = self.shared.state.lock();
            let callback = match &mut *state {
                State::Done(_) => return Err(SignalError::AlreadyCompleted),
                State::Pending(callback) => callback.take(),
            };
            match callback {
                Some(cb) => {
                    *state = State::Done(None);
                    Some((cb, outcome))
                }
                None => {
                    *state = State::Done(Some(outcome));
                    None
                }
            }
        };

        match deliver {
            Some((cb, outcome)) => cb(outcome),
            None => {
                self.shared.ready.notify_all();
            }
        }
        Ok(())
    }

    /// `true` once a terminal outcome has been written.
    pub fn is_completed(&self) -> bool {
        matches!(*self.shared.state.lock(), State::Done(_))
    }
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        let _ = self.complete(Err(StepError::Abandoned));
    }
}

impl fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("completed", &self.is_completed())
            .finish()
    }
}

impl Completion {
    /// Block the current thread until the outcome is available.
    pub fn wait(self) -> Outcome {
        let mut state = self.shared.state.lock();
        loop {
            if let State::Done(outcome) = &mut *state {
                return outcome.take().unwrap_or(Err(StepError::Abandoned));
            }
            self.shared.ready.wait(&mut state);
        }
    }

    /// Like [`Completion::wait`] but gives up after `timeout`, handing the completion back.
    pub fn wait_timeout(self, timeout: Duration) -> Result<Outcome, Completion> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        let mut timed_out = false;
        loop {
            if let State::Done(outcome) = &mut *state {
                return Ok(outcome.take().unwrap_or(Err(StepError::Abandoned)));
            }
            if timed_out {
                break;
            }
            timed_out = self.shared.ready.wait_until(&mut state, deadline).timed_out();
        }
        drop(state);
        Err(self)
    }

    /// Run `f` with the outcome as soon as it is written.
    ///
    /// If the outcome is already there, `f` runs immediately on the calling
    /// thread; otherwise it runs on whichever thread performs the terminal write.
    pub fn on_complete<F>(self, f: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let ready = {
            let mut state = self.shared.state.lock();
            match &mut *state {
                State::Pending(slot) => {
                    *slot = Some(Box::new(f));
                    return;
                }
                State::Done(outcome) => outcome.take().unwrap_or(Err(StepError::Abandoned)),
            }
        };
        f(ready);
    }

    /// `true` once a terminal outcome has been written.
    pub fn is_completed(&self) -> bool {
        matches!(*self.shared.state.lock(), State::Done(_))
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("completed", &self.is_completed())
            .finish()
    }
}
