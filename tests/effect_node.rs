use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use effect_node::{
    buffer::{MidiEvent, TimedMidiEvent},
    effects::{GainEffect, TransposeEffect},
    graph::{
        BufferSource, EffectNode, EffectUnit, GraphPlayer, Node, RenderContext, TimelineTiming,
        TransportInfo,
    },
    params::BoolParameter,
    transport::{FixedContext, PlayHead, RenderContextProvider, TrackMuteState},
    EngineConfig,
};

const SAMPLE_RATE: f64 = 48_000.0;
const BLOCK: usize = 64;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Unit that records what the node hands it and counts lifecycle calls.
struct RecordingEffect {
    enabled: BoolParameter,
    initialised: AtomicBool,
    initialize_calls: AtomicUsize,
    deinitialize_calls: AtomicUsize,
    latency: usize,
    contexts: Mutex<Vec<(TransportInfo, bool)>>,
}

impl RecordingEffect {
    fn new(latency: usize) -> Arc<Self> {
        Arc::new(Self {
            enabled: BoolParameter::new("enabled", true),
            initialised: AtomicBool::new(false),
            initialize_calls: AtomicUsize::new(0),
            deinitialize_calls: AtomicUsize::new(0),
            latency,
            contexts: Mutex::new(Vec::new()),
        })
    }

    fn applied(&self) -> Vec<(TransportInfo, bool)> {
        self.contexts.lock().unwrap().clone()
    }
}

impl EffectUnit for RecordingEffect {
    fn id(&self) -> u64 {
        77
    }

    fn initialize(&self, _sample_rate: f64, _block_size: usize) {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        self.initialised.store(true, Ordering::SeqCst);
    }

    fn deinitialize(&self) {
        self.deinitialize_calls.fetch_add(1, Ordering::SeqCst);
        self.initialised.store(false, Ordering::SeqCst);
    }

    fn needs_initializing(&self) -> bool {
        !self.initialised.load(Ordering::SeqCst)
    }

    fn apply(&self, context: &mut RenderContext<'_>) {
        self.contexts
            .lock()
            .unwrap()
            .push((context.transport, context.midi.all_notes_off));
    }

    fn enabled_param(&self) -> &BoolParameter {
        &self.enabled
    }

    fn audio_input_count(&self) -> usize {
        2
    }

    fn latency_samples(&self) -> usize {
        self.latency
    }
}

fn ramp() -> BufferSource {
    BufferSource::new(1).with_generator(|channel, n| channel as f32 * 1000.0 + n as f32)
}

fn timeline(playhead: &Arc<PlayHead>) -> TimelineTiming {
    TimelineTiming::new(playhead.clone())
}

#[test]
fn properties_aggregate_input_and_unit() {
    init_logging();
    let note = TimedMidiEvent::new(0.0, MidiEvent::NoteOn { channel: 0, key: 60, velocity: 90 });
    let source = BufferSource::new(1).with_latency(64).with_midi(vec![note]);
    let gain = Arc::new(GainEffect::new(2, 1.0));
    let node = EffectNode::new(
        source,
        gain.clone(),
        SAMPLE_RATE,
        BLOCK,
        timeline(&Arc::new(PlayHead::new())),
    );

    let props = node.properties();
    assert!(props.has_audio);
    assert!(props.has_midi);
    assert_eq!(props.num_channels, 2);
    assert_eq!(props.latency_samples, 64);
    assert_eq!(props.node_id, gain.id());
}

#[test]
fn disabled_unit_passes_input_through() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let gain = Arc::new(GainEffect::new(2, 0.0));
    gain.enabled_param().set(false);

    let node = EffectNode::new(ramp(), gain, SAMPLE_RATE, BLOCK, timeline(&playhead));
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK))
        .unwrap()
        .with_block_state(playhead);

    player.process_next(BLOCK);
    let output = player.process_next(BLOCK);

    assert_eq!(output.audio.num_channels(), 2);
    assert_eq!(output.audio.channel(0)[0], 64.0);
    assert_eq!(output.audio.channel(0)[BLOCK - 1], 127.0);
    assert!(output.audio.channel(1).iter().all(|s| *s == 0.0));
}

#[test]
fn enabled_unit_processes_in_place() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let node = EffectNode::new(
        ramp(),
        Arc::new(GainEffect::new(1, 0.5)),
        SAMPLE_RATE,
        BLOCK,
        timeline(&playhead),
    );
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK)).unwrap();

    let output = player.process_next(BLOCK);
    assert_eq!(output.audio.channel(0)[10], 5.0);
}

#[test]
fn jump_sets_all_notes_off_for_one_block() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let effect = RecordingEffect::new(0);
    let node = EffectNode::new(ramp(), effect.clone(), SAMPLE_RATE, BLOCK, timeline(&playhead));
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK))
        .unwrap()
        .with_block_state(playhead.clone());

    playhead.play();
    player.process_next(BLOCK);
    playhead.seek(48_000);
    let jumped = player.process_next(BLOCK).midi.all_notes_off;
    let after = player.process_next(BLOCK).midi.all_notes_off;

    assert!(jumped);
    assert!(!after);

    let applied = effect.applied();
    let flags: Vec<bool> = applied.iter().map(|(_, flag)| *flag).collect();
    assert_eq!(flags, vec![false, true, false]);
    assert_eq!(applied[1].0.edit_time, 1.0);
}

#[test]
fn mute_edge_flushes_notes_once() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let mute = Arc::new(TrackMuteState::new());
    let effect = RecordingEffect::new(0);
    let timing = timeline(&playhead).with_mute_state(mute.clone());
    let node = EffectNode::new(ramp(), effect.clone(), SAMPLE_RATE, BLOCK, timing);
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK))
        .unwrap()
        .with_block_state(playhead.clone())
        .with_block_state(mute.clone());

    player.process_next(BLOCK);
    mute.set_muted(true);

    let flags: Vec<bool> = (0..3)
        .map(|_| player.process_next(BLOCK).midi.all_notes_off)
        .collect();
    assert_eq!(flags, vec![true, false, false]);

    // Muted and not processed: the unit only ran before the mute
    assert_eq!(effect.applied().len(), 1);
    assert_eq!(player.output().audio.channel(0)[0], (3 * BLOCK) as f32);
}

#[test]
fn muted_track_keeps_processing_when_asked_to() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let mute = Arc::new(TrackMuteState::new());
    mute.set_process_while_muted(true);
    mute.set_muted(true);

    let effect = RecordingEffect::new(0);
    let timing = timeline(&playhead).with_mute_state(mute.clone());
    let node = EffectNode::new(ramp(), effect.clone(), SAMPLE_RATE, BLOCK, timing);
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK))
        .unwrap()
        .with_block_state(mute.clone());

    let flushed = player.process_next(BLOCK).midi.all_notes_off;

    assert!(!flushed);
    assert_eq!(effect.applied().len(), 1);
}

#[test]
fn automation_time_leads_by_latency() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let effect = RecordingEffect::new(480);
    let node = EffectNode::new(ramp(), effect.clone(), SAMPLE_RATE, BLOCK, timeline(&playhead));
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK))
        .unwrap()
        .with_block_state(playhead.clone());

    assert_eq!(player.properties().latency_samples, 480);

    playhead.seek(4800);
    playhead.play();
    player.process_next(BLOCK);

    let (transport, _) = effect.applied()[0];
    assert!((transport.edit_time - 0.09).abs() < 1e-12);
    assert!(transport.is_playing);
}

#[test]
fn provider_supplies_context_without_jump_checks() {
    init_logging();
    let provider = Arc::new(FixedContext::preview());
    provider.set_edit_time(12.5);

    let effect = RecordingEffect::new(0);
    let node = EffectNode::new(
        ramp(),
        effect.clone(),
        SAMPLE_RATE,
        BLOCK,
        provider.clone() as Arc<dyn RenderContextProvider>,
    );
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK)).unwrap();

    let flushed = player.process_next(BLOCK).midi.all_notes_off;

    let (transport, _) = effect.applied()[0];
    assert!(!flushed);
    assert_eq!(transport.edit_time, 12.5);
    assert!(transport.is_playing);
}

#[test]
fn dropping_the_node_deinitialises_once() {
    init_logging();
    let effect = RecordingEffect::new(0);
    let node = EffectNode::new(
        ramp(),
        effect.clone(),
        SAMPLE_RATE,
        BLOCK,
        timeline(&Arc::new(PlayHead::new())),
    );
    assert_eq!(effect.initialize_calls.load(Ordering::SeqCst), 1);

    drop(node);
    assert_eq!(effect.deinitialize_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unit_deinitialised_by_owner_is_left_alone() {
    init_logging();
    let effect = RecordingEffect::new(0);
    let node = EffectNode::new(
        ramp(),
        effect.clone(),
        SAMPLE_RATE,
        BLOCK,
        timeline(&Arc::new(PlayHead::new())),
    );

    effect.deinitialize();
    drop(node);

    assert_eq!(effect.deinitialize_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn transposes_notes_through_a_chain() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let note = TimedMidiEvent::new(0.0, MidiEvent::NoteOn { channel: 0, key: 60, velocity: 90 });
    let source = BufferSource::new(0).with_midi(vec![note]);

    let up = EffectNode::new(
        source,
        Arc::new(TransposeEffect::new(12)),
        SAMPLE_RATE,
        BLOCK,
        timeline(&playhead),
    );
    let down: Box<dyn Node> = Box::new(EffectNode::new(
        up,
        Arc::new(TransposeEffect::new(-5)),
        SAMPLE_RATE,
        BLOCK,
        timeline(&playhead),
    ));
    let mut player = GraphPlayer::new(down, EngineConfig::new(SAMPLE_RATE, BLOCK)).unwrap();

    assert!(player.properties().has_midi);
    let output = player.process_next(BLOCK);
    let keys: Vec<u8> = output.midi.iter().filter_map(|e| e.event.key()).collect();
    assert_eq!(keys, vec![67]);
}

#[test]
fn jump_and_mute_edge_in_one_block_flag_once() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let mute = Arc::new(TrackMuteState::new());
    let effect = RecordingEffect::new(0);
    let timing = timeline(&playhead).with_mute_state(mute.clone());
    let node = EffectNode::new(ramp(), effect.clone(), SAMPLE_RATE, BLOCK, timing);
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK))
        .unwrap()
        .with_block_state(playhead.clone())
        .with_block_state(mute.clone());

    playhead.play();
    player.process_next(BLOCK);

    playhead.seek(96_000);
    mute.set_muted(true);
    let both = player.process_next(BLOCK).midi.all_notes_off;
    let after = player.process_next(BLOCK).midi.all_notes_off;

    assert!(both);
    assert!(!after);
}

#[test]
fn short_block_is_copied_through() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let gain = Arc::new(GainEffect::new(2, 0.0));
    gain.enabled_param().set(false);

    let node = EffectNode::new(ramp(), gain, SAMPLE_RATE, BLOCK, timeline(&playhead));
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK)).unwrap();

    player.process_next(BLOCK);
    let output = player.process_next(BLOCK / 4);

    assert_eq!(output.audio.num_frames(), BLOCK / 4);
    let expected: Vec<f32> = (BLOCK..BLOCK + BLOCK / 4).map(|n| n as f32).collect();
    assert_eq!(output.audio.channel(0), expected.as_slice());
    assert!(output.audio.channel(1).iter().all(|s| *s == 0.0));
}

#[test]
fn automation_offset_ignores_upstream_latency() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let effect = RecordingEffect::new(480);
    let source = ramp().with_latency(960);
    let node = EffectNode::new(source, effect.clone(), SAMPLE_RATE, BLOCK, timeline(&playhead));
    let mut player = GraphPlayer::new(node, EngineConfig::new(SAMPLE_RATE, BLOCK))
        .unwrap()
        .with_block_state(playhead.clone());

    assert_eq!(player.properties().latency_samples, 1_440);

    playhead.seek(48_000);
    playhead.play();
    player.process_next(BLOCK);

    let (transport, _) = effect.applied()[0];
    assert!((transport.edit_time - 0.99).abs() < 1e-12);
}

#[test]
fn chained_latencies_add_up() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let first = EffectNode::new(
        ramp(),
        RecordingEffect::new(100),
        SAMPLE_RATE,
        BLOCK,
        timeline(&playhead),
    );
    let second = EffectNode::new(
        first,
        RecordingEffect::new(50),
        SAMPLE_RATE,
        BLOCK,
        timeline(&playhead),
    );

    assert_eq!(second.properties().latency_samples, 150);
}

#[test]
fn rendering_config_reaches_the_unit() {
    init_logging();
    let playhead = Arc::new(PlayHead::new());
    let config = EngineConfig::new(SAMPLE_RATE, BLOCK).rendering(true);
    let effect = RecordingEffect::new(0);
    let node = EffectNode::new(
        ramp(),
        effect.clone(),
        config.sample_rate,
        config.block_size,
        TimelineTiming::from_config(playhead.clone(), &config),
    );
    let mut player = GraphPlayer::new(node, config).unwrap();

    player.process_next(BLOCK);

    let (transport, _) = effect.applied()[0];
    assert!(transport.is_rendering);
}
