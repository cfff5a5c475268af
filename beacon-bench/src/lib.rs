//! Benchmark helpers for beacon. See `benches/` for the actual benchmarks.
