/// Human-readable counter name.
///
/// Only used to tell counters apart in logs.
pub type CounterName = String;

/// Inclusive upper bound of a counting run.
///
/// A run with `MaxCount = 0` still performs exactly one step (step `0`).
pub type MaxCount = u64;

/// Per-step delay in milliseconds, as it appears in serialized descriptors.
pub type DelayMs = u64;
