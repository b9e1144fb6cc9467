use std::sync::LazyLock;
use std::time::{Duration, Instant};

static MONOTONIC_ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Monotonic time since process start.
///
/// Hardware event timestamps and this clock share no origin; the engine only
/// ever compares durations from the same source, never across them.
pub fn get_monotonic_time() -> Duration {
    MONOTONIC_ORIGIN.elapsed()
}
