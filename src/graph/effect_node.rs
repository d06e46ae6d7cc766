use std::sync::Arc;

use log::debug;

use crate::{
    buffer::{ChannelLayout, MidiBuffer},
    config::EngineConfig,
    graph::{
        effect::{RenderContext, SharedEffect, TransportInfo},
        node::{Node, NodeBuffers, NodeProperties, PrepareInfo},
    },
    time::{sample_to_time, SampleRange},
    transport::{MuteState, Playhead, RenderContextProvider},
    MIDI_BUFFER_CAPACITY,
};

/*
Effect Node
===========

Hosts one effect unit inside the graph. Every block it:

1. Copies the input's audio into its own output, channel for channel
   (extra input channels are dropped, extra output channels start silent)
2. Stages the input's MIDI in a scratch list
3. Decides whether the unit runs:
     enabled parameter ──┬── playhead jumped?   → all-notes-off
                         └── track not processed? → run only if audible,
                                                    all-notes-off on the mute edge
4. Runs the unit in place on the output (if it should run)
5. Publishes the scratch MIDI

  input ──copy──→ [output audio] ──apply()──→ downstream
  input ──copy──→ [scratch MIDI] ──apply()──→ output MIDI ──→ downstream

Skipping the unit is *not* muting: downstream still sees the pass-through
audio and MIDI. Silencing a muted track happens further down the graph.

Two timing sources exist, picked once at construction:

  Timeline:  playhead maps reference samples to edit time, optional mute state
  Provider:  an external provider hands over the whole transport context
             (standalone previews, no timeline involved)

The node reports the input's latency plus the unit's. Edit time handed to
the unit is moved earlier by the unit's own latency so automation lines up
with the (delayed) audio it affects.
*/

/// Timeline-driven timing: playhead, optional track mute state and the
/// offline-render flag.
#[derive(Clone)]
pub struct TimelineTiming {
    pub playhead: Arc<dyn Playhead>,
    pub mute_state: Option<Arc<dyn MuteState>>,
    pub rendering: bool,
}

impl TimelineTiming {
    pub fn new(playhead: Arc<dyn Playhead>) -> Self {
        Self {
            playhead,
            mute_state: None,
            rendering: false,
        }
    }

    /// Timeline timing that renders offline when `config` says so
    pub fn from_config(playhead: Arc<dyn Playhead>, config: &EngineConfig) -> Self {
        Self::new(playhead).rendering(config.rendering)
    }

    pub fn with_mute_state(mut self, mute_state: Arc<dyn MuteState>) -> Self {
        self.mute_state = Some(mute_state);
        self
    }

    pub fn rendering(mut self, rendering: bool) -> Self {
        self.rendering = rendering;
        self
    }
}

/// Where an effect node gets its transport context from.
#[derive(Clone)]
pub enum TimingMode {
    Timeline(TimelineTiming),
    Provider(Arc<dyn RenderContextProvider>),
}

impl From<TimelineTiming> for TimingMode {
    fn from(timing: TimelineTiming) -> Self {
        TimingMode::Timeline(timing)
    }
}

impl From<Arc<dyn RenderContextProvider>> for TimingMode {
    fn from(provider: Arc<dyn RenderContextProvider>) -> Self {
        TimingMode::Provider(provider)
    }
}

impl TimingMode {
    fn transport_info(
        &self,
        reference_sample: i64,
        sample_rate: f64,
        automation_adjustment_time: f64,
    ) -> TransportInfo {
        match self {
            TimingMode::Provider(provider) => provider.current_context(),
            TimingMode::Timeline(timing) => {
                let playhead = &timing.playhead;
                let timeline_sample = playhead.reference_sample_to_timeline(reference_sample);

                TransportInfo {
                    edit_time: sample_to_time(timeline_sample, sample_rate)
                        + automation_adjustment_time,
                    is_playing: playhead.is_playing(),
                    is_scrubbing: playhead.is_user_scrubbing(),
                    is_rendering: timing.rendering,
                    allow_bypassed_processing: false,
                }
            }
        }
    }
}

/// Graph node that runs an [`EffectUnit`](crate::graph::effect::EffectUnit)
/// over its input's output.
pub struct EffectNode {
    input: Box<dyn Node>,
    effect: SharedEffect,
    timing: TimingMode,
    sample_rate: f64,
    initialised: bool,
    automation_adjustment_time: f64,
    midi: MidiBuffer,
    output: NodeBuffers,
}

impl EffectNode {
    /// Wrap `input` with `effect`, initialising the unit straight away.
    ///
    /// `sample_rate` is fixed for the node's lifetime; `prepare` must be
    /// called with the same rate.
    pub fn new<N: Node + 'static>(
        input: N,
        effect: SharedEffect,
        sample_rate: f64,
        block_size: usize,
        timing: impl Into<TimingMode>,
    ) -> Self {
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "effect node needs a positive sample rate"
        );

        let mut node = Self {
            input: Box::new(input),
            effect,
            timing: timing.into(),
            sample_rate,
            initialised: false,
            automation_adjustment_time: 0.0,
            midi: MidiBuffer::new(),
            output: NodeBuffers::default(),
        };
        node.initialise_effect(block_size);
        node
    }

    fn initialise_effect(&mut self, block_size: usize) {
        self.effect.initialize(self.sample_rate, block_size);
        self.initialised = true;
        debug!(
            "effect {} initialised at {} Hz, {} frames",
            self.effect.id(),
            self.sample_rate,
            block_size
        );
    }

    pub fn effect(&self) -> &SharedEffect {
        &self.effect
    }

    pub fn timing(&self) -> &TimingMode {
        &self.timing
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Seconds added to the timeline position handed to the unit (zero or negative)
    pub fn automation_adjustment_time(&self) -> f64 {
        self.automation_adjustment_time
    }
}

impl Node for EffectNode {
    fn properties(&self) -> NodeProperties {
        let mut props = self.input.properties();
        let audio_inputs = self.effect.audio_input_count();

        props.num_channels = props.num_channels.max(audio_inputs);
        props.has_audio = props.has_audio || audio_inputs > 0;
        props.has_midi = props.has_midi || self.effect.midi_input_count() > 0;
        props.latency_samples += self.effect.latency_samples();
        props.node_id = self.effect.id();

        props
    }

    fn prepare(&mut self, info: &PrepareInfo) {
        assert_eq!(
            self.sample_rate, info.sample_rate,
            "effect node prepared at a different sample rate than it was built for"
        );

        let props = self.properties();

        // Only the unit's own delay shifts its automation
        let unit_latency = self.effect.latency_samples();
        self.automation_adjustment_time = if unit_latency > 0 {
            -sample_to_time(unit_latency as i64, self.sample_rate)
        } else {
            0.0
        };

        self.output = NodeBuffers::allocate(props.num_channels, info.block_size);
        self.midi.reserve(MIDI_BUFFER_CAPACITY);

        debug!(
            "effect node {} prepared: {} channels, {} samples latency, automation offset {:.6}s",
            props.node_id,
            props.num_channels,
            props.latency_samples,
            self.automation_adjustment_time
        );
    }

    fn process(&mut self, range: SampleRange) {
        let num_frames = range.len();
        let Self {
            input,
            effect,
            timing,
            sample_rate,
            automation_adjustment_time,
            midi,
            output,
            ..
        } = self;
        let source = input.output();

        // Copy the input to the output, then process the output in place as
        // that buffer has the node's channel count
        output.audio.set_num_frames(num_frames);
        let channels_to_copy = source.audio.num_channels().min(output.audio.num_channels());

        if channels_to_copy > 0 {
            assert_eq!(
                source.audio.num_frames(),
                num_frames,
                "input block length differs from this node's block"
            );
            output.audio.copy_channels_from(&source.audio, channels_to_copy);
        }

        for channel in output.audio.channels_mut().skip(channels_to_copy) {
            channel.fill(0.0);
        }

        // At most MIDI_BUFFER_CAPACITY events per block; the rest are dropped
        midi.copy_from(&source.midi);
        let mut should_process = effect.enabled_param().get();

        if let TimingMode::Timeline(timeline) = timing {
            if timeline.playhead.did_just_jump() {
                midi.all_notes_off = true;
            }

            if let Some(mute_state) = &timeline.mute_state {
                if !mute_state.should_track_contents_be_processed() {
                    should_process = should_process && mute_state.should_track_be_audible();

                    if mute_state.was_just_muted() {
                        midi.all_notes_off = true;
                    }
                }
            }
        }

        if should_process {
            let transport =
                timing.transport_info(range.start, *sample_rate, *automation_adjustment_time);
            let dest_layout = ChannelLayout::canonical(output.audio.num_channels());

            let mut context = RenderContext {
                dest_buffer: &mut output.audio,
                dest_layout,
                buffer_start_sample: 0,
                buffer_num_samples: num_frames,
                midi: &mut *midi,
                midi_buffer_offset: 0.0,
                transport,
            };
            effect.apply(&mut context);
        }

        output.midi.copy_from(midi);
    }

    fn output(&self) -> &NodeBuffers {
        &self.output
    }

    fn visit_inputs(&mut self, f: &mut dyn FnMut(&mut dyn Node)) {
        f(self.input.as_mut());
    }
}

impl Drop for EffectNode {
    fn drop(&mut self) {
        if self.initialised && !self.effect.needs_initializing() {
            self.effect.deinitialize();
            debug!("effect {} deinitialised", self.effect.id());
        }
    }
}
