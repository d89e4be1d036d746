use thiserror::Error;

use tally_core::CoreError;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid runner configuration: {0}")]
    InvalidRunnerConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
