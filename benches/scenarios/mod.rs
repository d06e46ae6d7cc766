//! Scenario benchmarks: effect units hosted in nodes, driven block by block.

mod effect_chain;

pub use effect_chain::bench_effect_chain;
