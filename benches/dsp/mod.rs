//! Benchmarks for low-level DSP primitives.

mod delay;
mod filter;

pub use delay::bench_delay;
pub use filter::bench_filter;
