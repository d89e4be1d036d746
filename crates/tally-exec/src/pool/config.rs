use serde::{Deserialize, Serialize};

use crate::ExecError;

/// Sizing of the shared worker pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PoolConfig {
    /// Number of worker threads; `0` lets rayon pick (available parallelism).
    pub workers: usize,
    /// Worker threads are named `{prefix}-{index}`; the timer thread `{prefix}-timer`.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            thread_name_prefix: "tally-pool".to_string(),
        }
    }
}

impl PoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Rules:
    /// - `thread_name_prefix` is not blank and contains no NUL byte.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.thread_name_prefix.trim().is_empty() {
            return Err(ExecError::InvalidRunnerConfig(
                "pool.thread_name_prefix cannot be empty".into(),
            ));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(ExecError::InvalidRunnerConfig(
                "pool.thread_name_prefix cannot contain NUL".into(),
            ));
        }
        Ok(())
    }
}
