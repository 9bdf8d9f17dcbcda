//! Hierarchies with a known oracle, for tests and the benchmark.
pub mod complex;
pub mod multi;
pub mod probe;
pub mod simple;

/// Runs `f` on a new thread, so it starts with an empty cache.
#[cfg(test)]
pub fn fresh<R: Send>(f: impl FnOnce() -> R + Send) -> R {
    std::thread::scope(|s| {
        s.spawn(f)
            .join()
            .unwrap_or_else(|e| std::panic::resume_unwind(e))
    })
}
