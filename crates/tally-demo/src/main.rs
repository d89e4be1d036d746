mod config;

use std::thread;

use anyhow::Context;
use tracing::info;

use tally_core::RunContext;
use tally_exec::{pool::PoolRunner, task::TaskRunner, thread::ThreadRunner};
use tally_observe::{init_local_offset, init_logger};

use crate::config::DemoConfig;

/// Sections of the demo, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Warmup,
    Threads,
    Pool,
    Tasks,
}

impl Stage {
    fn as_label(&self) -> &'static str {
        match self {
            Stage::Warmup => "warmup",
            Stage::Threads => "threads",
            Stage::Pool => "pool",
            Stage::Tasks => "tasks",
        }
    }

    fn banner(&self) -> &'static str {
        match self {
            Stage::Warmup => "warming up: counting up and down on two threads...",
            Stage::Threads => "counting with regular threads...",
            Stage::Pool => "starting counters on the thread pool with completion signals...",
            Stage::Tasks => "starting counters on async tasks...",
        }
    }

    fn announce(self) {
        info!(stage = self.as_label(), "{}", self.banner());
    }
}

fn main() -> anyhow::Result<()> {
    // Must happen before any thread is spawned.
    init_local_offset();

    let cfg = DemoConfig::default();
    cfg.validate()?;

    // 1) logger
    init_logger(&cfg.logger)?;
    info!("logger initialized");

    let ctx = RunContext::default();

    // 2) warm-up: main counts up while a side thread counts down
    Stage::Warmup.announce();
    warmup(cfg.warmup_count)?;

    // 3) one thread per counter
    Stage::Threads.announce();
    ThreadRunner::new(ctx.clone()).run(cfg.thread_counters.clone())?;
    info!("both threads have finished");

    // 4) worker pool + continuations, waited on synchronously
    Stage::Pool.announce();
    let pool = PoolRunner::new(&cfg.pool, ctx.clone())?;
    pool.run(cfg.pool_counters.clone()).wait()?;
    drop(pool);

    // 5) async tasks
    Stage::Tasks.announce();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .thread_name("tally-rt")
        .build()
        .context("failed to build tokio runtime")?;
    rt.block_on(TaskRunner::new(ctx).run(cfg.task_counters))?;
    info!("async tasks completed");

    Ok(())
}

fn warmup(count: u64) -> anyhow::Result<()> {
    let side = thread::Builder::new()
        .name("warmup".into())
        .spawn(move || {
            for i in (1..=count).rev() {
                info!(i, "counting down");
            }
        })
        .context("failed to spawn warm-up thread")?;

    for i in 0..count {
        info!(i, "counting up");
    }

    side.join()
        .map_err(|_| anyhow::anyhow!("warm-up thread panicked"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_has_its_own_banner() {
        let stages = [Stage::Warmup, Stage::Threads, Stage::Pool, Stage::Tasks];

        for (i, a) in stages.iter().enumerate() {
            assert!(a.banner().ends_with("..."), "banner of {a:?}");
            for b in &stages[i + 1..] {
                assert_ne!(a.banner(), b.banner());
                assert_ne!(a.as_label(), b.as_label());
            }
        }
    }

    #[test]
    fn banners_name_the_execution_model() {
        assert!(Stage::Threads.banner().contains("threads"));
        assert!(Stage::Pool.banner().contains("thread pool"));
        assert!(Stage::Tasks.banner().contains("async tasks"));
    }

    #[test]
    fn warmup_joins_side_thread() {
        assert!(warmup(3).is_ok());
    }
}
