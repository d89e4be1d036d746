use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid counter: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
