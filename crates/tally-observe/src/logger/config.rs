use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

use crate::logger::object::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Line format on stdout.
    pub format: LoggerFormat,
    /// Filter expression (e.g. `"info"`, `"tally_exec=debug,info"`).
    pub level: LoggerLevel,
    /// Timezone for timestamps.
    pub tz: LoggerTimeZone,
    /// Include the module path of the emitting code.
    pub with_targets: bool,
    /// Include the name of the emitting thread.
    ///
    /// Counters run on dedicated threads, pool workers or runtime workers;
    /// the thread name is what tells those apart in the output.
    pub with_thread_names: bool,
    /// Colored output; only honoured when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: false,
            with_thread_names: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// `use_color`, unless stdout is redirected.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = LoggerConfig::default();

        assert_eq!(config.format, LoggerFormat::Text);
        assert_eq!(config.tz, LoggerTimeZone::Utc);
        assert_eq!(config.level.as_str(), "info");
        assert!(!config.with_targets);
        assert!(config.with_thread_names);
        assert!(config.use_color);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: LoggerConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.level.as_str(), "info");
        assert_eq!(config.format, LoggerFormat::Text);
        assert!(config.with_thread_names);
    }

    #[test]
    fn partial_deserialization() {
        let json = r#"{"format": "json", "level": "debug", "withThreadNames": false, "tz": "local"}"#;
        let config: LoggerConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.format, LoggerFormat::Json);
        assert_eq!(config.level.as_str(), "debug");
        assert_eq!(config.tz, LoggerTimeZone::Local);
        assert!(!config.with_thread_names);
        assert!(config.use_color);
    }

    #[test]
    fn color_requires_flag() {
        let config = LoggerConfig {
            use_color: false,
            ..Default::default()
        };
        assert!(!config.should_use_color());
    }
}
