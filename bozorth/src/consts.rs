use std::sync::atomic::{AtomicUsize, Ordering};

pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 20.0;
pub const DEFAULT_ANGLE_TOLERANCE: i32 = 15;

static PARALLEL_MINUTIAE_THRESHOLD: AtomicUsize = AtomicUsize::new(64);
static PARALLEL_PAIRS_THRESHOLD: AtomicUsize = AtomicUsize::new(4096);

/// Templates with at least this many minutiae have their pairwise tables built in parallel.
pub fn parallel_minutiae_threshold() -> usize {
    PARALLEL_MINUTIAE_THRESHOLD.load(Ordering::Relaxed)
}

pub fn set_parallel_minutiae_threshold(n: usize) {
    PARALLEL_MINUTIAE_THRESHOLD.store(n, Ordering::SeqCst)
}

/// Consistency graphs over at least this many matched pairs are built in parallel.
pub fn parallel_pairs_threshold() -> usize {
    PARALLEL_PAIRS_THRESHOLD.load(Ordering::Relaxed)
}

pub fn set_parallel_pairs_threshold(n: usize) {
    PARALLEL_PAIRS_THRESHOLD.store(n, Ordering::SeqCst)
}
