//! Shared helpers for the crate's thread-based tests.

use std::time::{Duration, Instant};

/// Polls `condition` every millisecond until it returns `true` or `timeout`
/// elapses.
///
/// # Errors
///
/// * If `timeout` elapses before the condition becomes `true`
pub(crate) fn wait_for_condition(
    condition: impl Fn() -> bool,
    timeout: Duration,
    description: &str,
) -> Result<(), String> {
    let start = Instant::now();

    while start.elapsed() < timeout {
        if condition() {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    Err(format!(
        "Timeout after {timeout:?} waiting for {description}"
    ))
}
