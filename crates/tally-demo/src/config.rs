use serde::{Deserialize, Serialize};

use tally_exec::pool::PoolConfig;
use tally_model::CounterSpec;
use tally_observe::LoggerConfig;

/// Everything the demo runs, with the stock values as defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemoConfig {
    pub logger: LoggerConfig,
    /// The warm-up counts `0..warmup_count` up on the main thread and
    /// `warmup_count..=1` down on a side thread.
    pub warmup_count: u64,
    pub thread_counters: Vec<CounterSpec>,
    pub pool_counters: Vec<CounterSpec>,
    pub task_counters: Vec<CounterSpec>,
    pub pool: PoolConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            warmup_count: 1000,
            thread_counters: counters(&[("Counter 1", 5, 250), ("Counter 2", 3, 500)]),
            pool_counters: counters(&[("Counter Task 1", 4, 300), ("Counter Task 2", 8, 200)]),
            task_counters: counters(&[("Async Counter 1", 5, 500), ("Async Counter 2", 6, 300)]),
            pool: PoolConfig::default(),
        }
    }
}

fn counters(table: &[(&str, u64, u64)]) -> Vec<CounterSpec> {
    table
        .iter()
        .map(|&(name, max, delay_ms)| {
            CounterSpec::with_delay_ms(name, max, delay_ms).expect("stock counter table is valid")
        })
        .collect()
}

impl DemoConfig {
    /// Rules:
    /// - the pool config is valid (see [`PoolConfig::validate`]).
    pub fn validate(&self) -> anyhow::Result<()> {
        self.pool.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn from_json(raw: &str) -> anyhow::Result<DemoConfig> {
        let cfg: DemoConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[test]
    fn defaults_match_stock_demo() {
        let cfg = DemoConfig::default();

        assert_eq!(cfg.warmup_count, 1000);
        assert_eq!(cfg.thread_counters.len(), 2);
        assert_eq!(cfg.pool_counters.len(), 2);
        assert_eq!(cfg.task_counters.len(), 2);

        let c = &cfg.pool_counters[1];
        assert_eq!(c.name(), "Counter Task 2");
        assert_eq!(c.max_count(), 8);
        assert_eq!(c.delay(), Duration::from_millis(200));

        let a = &cfg.task_counters[0];
        assert_eq!(a.name(), "Async Counter 1");
        assert_eq!(a.delay(), Duration::from_millis(500));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn stock_tables_keep_every_entry() {
        let specs = counters(&[("one", 1, 0), ("two", 2, 5), ("three", 0, 10)]);

        let names: Vec<_> = specs.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }

    #[test]
    #[should_panic(expected = "stock counter table is valid")]
    fn invalid_stock_entry_is_not_skipped() {
        let _ = counters(&[("ok", 1, 0), (" ", 1, 0)]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = from_json(
            r#"{
                "warmupCount": 10,
                "taskCounters": [{"name": "Solo", "maxCount": 2, "delayMs": 5}]
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.warmup_count, 10);
        assert_eq!(cfg.task_counters.len(), 1);
        assert_eq!(cfg.task_counters[0].name(), "Solo");
        assert_eq!(cfg.thread_counters[0].name(), "Counter 1");
    }

    #[test]
    fn blank_counter_name_is_rejected() {
        let res = from_json(r#"{"poolCounters": [{"name": " ", "maxCount": 1}]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn bad_pool_prefix_is_rejected() {
        let res = from_json(r#"{"pool": {"threadNamePrefix": ""}}"#);
        assert!(res.is_err());
    }
}
