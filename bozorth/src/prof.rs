use std::time::Instant;

use tracing::trace;

/// Runs `f` and reports its wall time at trace level.
#[inline]
pub fn timeit<T>(stage: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    trace!(stage = stage, elapsed = ?start.elapsed(), "stage finished");
    result
}
