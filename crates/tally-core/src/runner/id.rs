use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequence for run identifiers.
static RUN_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_seq() -> u64 {
    RUN_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Build a run id used to correlate log lines of one counting run.
///
/// Format: `{runner}-{counter}-{seq:x}`, with whitespace in the counter name
/// replaced by `_` so the id stays a single token.
pub fn make_run_id(runner: &str, counter: &str) -> String {
    let counter: String = counter
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{runner}-{counter}-{seq:x}", seq = next_seq())
}
