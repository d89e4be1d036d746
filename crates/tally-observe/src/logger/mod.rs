mod config;
mod error;
mod log;
mod object;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerRfc3339, LoggerTimeZone, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// Every counter line in the workspace is a `tracing` event, so this is what
/// turns progress into stdout output. Only the first call succeeds.
///
/// For [`LoggerTimeZone::Local`] call [`init_local_offset`] first, before any thread exists.
///
/// # Examples
/// ```rust
/// use tally_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("first init succeeds");
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        let cfg = LoggerConfig {
            use_color: false,
            ..Default::default()
        };

        // Another test in this binary may already own the global subscriber.
        let _ = init_logger(&cfg);
        let second = init_logger(&cfg);

        assert!(matches!(second, Err(LoggerError::AlreadyInitialized)));
    }
}
