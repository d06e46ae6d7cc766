//! Source nodes that feed effect nodes.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::{
    buffer::TimedMidiEvent,
    dsp::oscillator::{Oscillator, OscillatorWaveform},
    graph::node::{Node, NodeBuffers, NodeProperties, PrepareInfo},
    time::SampleRange,
};

type SampleGenerator = Box<dyn Fn(usize, i64) -> f32 + Send>;

/// Deterministic source: audio computed from `(channel, reference sample)`,
/// plus the same MIDI events in every block.
///
/// Handy for tests and benchmarks because the expected output of any block
/// can be recomputed from its range.
pub struct BufferSource {
    num_channels: usize,
    latency_samples: usize,
    node_id: u64,
    generator: SampleGenerator,
    midi: Vec<TimedMidiEvent>,
    output: NodeBuffers,
}

impl BufferSource {
    /// Silent source with `num_channels` channels
    pub fn new(num_channels: usize) -> Self {
        Self {
            num_channels,
            latency_samples: 0,
            node_id: 0,
            generator: Box::new(|_, _| 0.0),
            midi: Vec::new(),
            output: NodeBuffers::default(),
        }
    }

    pub fn with_generator(
        mut self,
        generator: impl Fn(usize, i64) -> f32 + Send + 'static,
    ) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Emit `events` in every block
    pub fn with_midi(mut self, events: Vec<TimedMidiEvent>) -> Self {
        self.midi = events;
        self
    }

    pub fn with_latency(mut self, latency_samples: usize) -> Self {
        self.latency_samples = latency_samples;
        self
    }

    pub fn with_node_id(mut self, node_id: u64) -> Self {
        self.node_id = node_id;
        self
    }

    /// Sample the generator would produce for `channel` at `reference_sample`
    pub fn sample_at(&self, channel: usize, reference_sample: i64) -> f32 {
        (self.generator)(channel, reference_sample)
    }
}

impl Node for BufferSource {
    fn properties(&self) -> NodeProperties {
        NodeProperties {
            has_audio: self.num_channels > 0,
            has_midi: !self.midi.is_empty(),
            num_channels: self.num_channels,
            latency_samples: self.latency_samples,
            node_id: self.node_id,
        }
    }

    fn prepare(&mut self, info: &PrepareInfo) {
        self.output = NodeBuffers::allocate(self.num_channels, info.block_size);
        self.output.midi.reserve(self.midi.len());
    }

    fn process(&mut self, range: SampleRange) {
        self.output.begin_block(range.len());

        for (channel_index, channel) in self.output.audio.channels_mut().enumerate() {
            for (offset, sample) in channel.iter_mut().enumerate() {
                *sample = (self.generator)(channel_index, range.start + offset as i64);
            }
        }

        for event in &self.midi {
            self.output.midi.push(*event);
        }
    }

    fn output(&self) -> &NodeBuffers {
        &self.output
    }
}

/// Continuous tone on every channel, optionally carrying MIDI pushed from
/// another thread through a lock-free queue.
pub struct ToneSource {
    num_channels: usize,
    frequency: f32,
    amplitude: f32,
    sample_rate: f32,
    oscillator: Oscillator,
    #[cfg(feature = "rtrb")]
    midi_queue: Option<Consumer<TimedMidiEvent>>,
    output: NodeBuffers,
}

impl ToneSource {
    pub fn new(waveform: OscillatorWaveform, frequency: f32, num_channels: usize) -> Self {
        Self {
            num_channels,
            frequency,
            amplitude: 0.25,
            sample_rate: 48_000.0,
            oscillator: Oscillator::new(waveform),
            #[cfg(feature = "rtrb")]
            midi_queue: None,
            output: NodeBuffers::default(),
        }
    }

    pub fn amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Forward events popped from `queue` as this node's MIDI output
    #[cfg(feature = "rtrb")]
    pub fn with_midi_queue(mut self, queue: Consumer<TimedMidiEvent>) -> Self {
        self.midi_queue = Some(queue);
        self
    }

    #[cfg(feature = "rtrb")]
    fn has_midi(&self) -> bool {
        self.midi_queue.is_some()
    }

    #[cfg(not(feature = "rtrb"))]
    fn has_midi(&self) -> bool {
        false
    }

    #[cfg(feature = "rtrb")]
    fn drain_midi_queue(&mut self) {
        if let Some(queue) = self.midi_queue.as_mut() {
            // Anything past the block's capacity waits for the next block
            while self.output.midi.len() < self.output.midi.capacity() {
                match queue.pop() {
                    Ok(event) => self.output.midi.push(event),
                    Err(_) => break,
                }
            }
        }
    }

    #[cfg(not(feature = "rtrb"))]
    fn drain_midi_queue(&mut self) {}
}

impl Node for ToneSource {
    fn properties(&self) -> NodeProperties {
        NodeProperties {
            has_audio: true,
            has_midi: self.has_midi(),
            num_channels: self.num_channels,
            latency_samples: 0,
            node_id: 0,
        }
    }

    fn prepare(&mut self, info: &PrepareInfo) {
        self.sample_rate = info.sample_rate as f32;
        self.output = NodeBuffers::allocate(self.num_channels, info.block_size);
    }

    fn process(&mut self, range: SampleRange) {
        self.output.begin_block(range.len());
        self.drain_midi_queue();

        let mut channels = self.output.audio.channels_mut();
        if let Some(first) = channels.next() {
            self.oscillator.render(first, self.frequency, self.sample_rate);
            for sample in first.iter_mut() {
                *sample *= self.amplitude;
            }
            // Mono tone copied to the remaining channels
            for channel in channels {
                channel.copy_from_slice(first);
            }
        }
    }

    fn output(&self) -> &NodeBuffers {
        &self.output
    }
}
