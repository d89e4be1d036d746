mod domain;
pub use domain::{CounterName, DelayMs, MaxCount};

mod error;
pub use error::{ModelError, ModelResult};

mod spec;
pub use spec::CounterSpec;
