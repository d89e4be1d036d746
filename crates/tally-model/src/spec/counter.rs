use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{CounterName, DelayMs, MaxCount},
    error::{ModelError, ModelResult},
};

/// Immutable description of one counting run.
///
/// `CounterSpec` describes *what* a runner should count:
/// - `name`      - identifier used in logs only
/// - `max_count` - inclusive upper bound (`0..=max_count` steps are performed)
/// - `delay`     - pause between consecutive steps
///
/// Runners own their specs; nothing is shared between two runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCounterSpec", into = "RawCounterSpec")]
pub struct CounterSpec {
    name: CounterName,
    max_count: MaxCount,
    delay: Duration,
}

impl CounterSpec {
    /// Create a validated counter descriptor.
    ///
    /// Rules:
    /// - `name` is not empty or whitespace-only;
    /// - `name` contains no NUL byte (it ends up in OS thread names).
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use tally_model::CounterSpec;
    ///
    /// let spec = CounterSpec::new("Counter 1", 5, Duration::from_millis(250)).unwrap();
    /// assert_eq!(spec.max_count(), 5);
    /// ```
    pub fn new(name: impl Into<CounterName>, max_count: MaxCount, delay: Duration) -> ModelResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::Invalid("counter name is empty".into()));
        }
        if name.contains('\0') {
            return Err(ModelError::Invalid(format!("counter name {name:?} contains a NUL byte")));
        }
        Ok(Self {
            name,
            max_count,
            delay,
        })
    }

    /// Convenience constructor taking the delay in milliseconds.
    pub fn with_delay_ms(name: impl Into<CounterName>, max_count: MaxCount, delay_ms: DelayMs) -> ModelResult<Self> {
        Self::new(name, max_count, Duration::from_millis(delay_ms))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn max_count(&self) -> MaxCount {
        self.max_count
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl fmt::Display for CounterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CounterSpec(name='{}', max={}, delay={}ms)",
            self.name,
            self.max_count,
            self.delay.as_millis()
        )
    }
}

/// Wire shape of [`CounterSpec`]; validated on the way in.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCounterSpec {
    name: CounterName,
    max_count: MaxCount,
    #[serde(default)]
    delay_ms: DelayMs,
}

impl TryFrom<RawCounterSpec> for CounterSpec {
    type Error = ModelError;
    fn try_from(raw: RawCounterSpec) -> Result<Self, Self::Error> {
        CounterSpec::with_delay_ms(raw.name, raw.max_count, raw.delay_ms)
    }
}

impl From<CounterSpec> for RawCounterSpec {
    fn from(spec: CounterSpec) -> Self {
        Self {
            name: spec.name,
            max_count: spec.max_count,
            delay_ms: u64::try_from(spec.delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
