//! Counter runners for the three execution models.
//!
//! - [`thread::ThreadRunner`] - one dedicated OS thread per counter.
//! - [`pool::PoolRunner`] - shared worker pool, timer-driven continuations, completion signals.
//! - [`task::TaskRunner`] - tokio tasks joined with a `JoinSet`.
mod error;
pub use error::ExecError;

pub mod thread;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "task")]
pub mod task;

#[cfg(test)]
mod testing;
