//! Wall-clock measurement for callers benchmarking repeated evaluations.

use std::time::Instant;

/// Runs `f` and returns `(elapsed seconds, result)`.
pub fn measure<T>(f: impl FnOnce() -> T) -> (f64, T) {
    let start = Instant::now();
    let result = f();
    (start.elapsed().as_secs_f64(), result)
}
