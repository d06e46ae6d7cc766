//! Benchmarks for the delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use effect_node::dsp::delay::DelayLine;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.01).sin()).collect();

        // 250ms at 48kHz
        let mut line = DelayLine::new(96_000);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("fixed", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                line.render(black_box(&mut buffer), black_box(12_000));
            })
        });

        let mut line = DelayLine::new(96_000);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("interpolated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    let delayed = line.read_interpolated(black_box(12_000.5));
                    line.write(*sample);
                    *sample = delayed;
                }
            })
        });
    }

    group.finish();
}
