//! Tone through hosted filter and delay units, the chain the demo plays.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use effect_node::{
    dsp::oscillator::OscillatorWaveform,
    effects::{DelayEffect, FilterEffect, GainEffect},
    graph::{EffectNode, GraphPlayer, Node, TimelineTiming, ToneSource},
    transport::{PlayHead, Playhead, TrackMuteState},
    EngineConfig,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

fn chain(block_size: usize, playhead: &Arc<PlayHead>, mute: &Arc<TrackMuteState>) -> GraphPlayer {
    let timing = || {
        TimelineTiming::new(playhead.clone() as Arc<dyn Playhead>).with_mute_state(mute.clone())
    };

    let tone = ToneSource::new(OscillatorWaveform::Saw, 110.0, 2);
    let filtered = EffectNode::new(
        tone,
        Arc::new(FilterEffect::lowpass(2, 900.0)),
        SAMPLE_RATE,
        block_size,
        timing(),
    );
    let delayed = EffectNode::new(
        filtered,
        Arc::new(DelayEffect::new(2, 250.0)),
        SAMPLE_RATE,
        block_size,
        timing(),
    );

    GraphPlayer::new(delayed, EngineConfig::new(SAMPLE_RATE, block_size))
        .expect("valid bench config")
        .with_block_state(playhead.clone())
        .with_block_state(mute.clone())
}

pub fn bench_effect_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/effect_chain");

    for &size in BLOCK_SIZES {
        let playhead = Arc::new(PlayHead::new());
        let mute = Arc::new(TrackMuteState::new());
        playhead.play();

        let mut player = chain(size, &playhead, &mute);
        group.bench_with_input(BenchmarkId::new("filter_delay", size), &size, |b, &size| {
            b.iter(|| black_box(player.process_next(size).audio.peak()))
        });

        // Track muted without processing: the node only copies its input
        mute.set_muted(true);
        let mut player = chain(size, &playhead, &mute);
        group.bench_with_input(BenchmarkId::new("muted_copy", size), &size, |b, &size| {
            b.iter(|| black_box(player.process_next(size).audio.peak()))
        });
        mute.set_muted(false);

        // Gain units stacked eight deep over a wide input
        let mut node: Box<dyn Node> = Box::new(ToneSource::new(OscillatorWaveform::Sine, 220.0, 8));
        for _ in 0..8 {
            node = Box::new(EffectNode::new(
                node,
                Arc::new(GainEffect::new(8, 0.9)),
                SAMPLE_RATE,
                size,
                TimelineTiming::new(playhead.clone()),
            ));
        }
        let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, size))
            .expect("valid bench config")
            .with_block_state(playhead.clone());
        group.bench_with_input(BenchmarkId::new("gain_stack_8", size), &size, |b, &size| {
            b.iter(|| black_box(player.process_next(size).audio.peak()))
        });
    }

    group.finish();
}
