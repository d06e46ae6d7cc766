#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    buffer::{AudioBlock, MidiBuffer},
    time::SampleRange,
};

/// What a node produces, as seen by the scheduler.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeProperties {
    pub has_audio: bool,
    pub has_midi: bool,
    pub num_channels: usize,
    pub latency_samples: usize,
    pub node_id: u64,
}

/// Settings handed to every node once, before the first block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrepareInfo {
    pub sample_rate: f64,
    pub block_size: usize,
}

/// A node's output for the current block.
#[derive(Debug, Clone, Default)]
pub struct NodeBuffers {
    pub audio: AudioBlock,
    pub midi: MidiBuffer,
}

impl NodeBuffers {
    /// Buffers sized for `num_channels` x `block_size` with reserved MIDI space
    pub fn allocate(num_channels: usize, block_size: usize) -> Self {
        Self {
            audio: AudioBlock::new(num_channels, block_size),
            midi: MidiBuffer::new(),
        }
    }

    /// Start a block: shrink to its length and drop last block's MIDI
    pub fn begin_block(&mut self, num_frames: usize) {
        self.audio.set_num_frames(num_frames);
        self.midi.clear();
    }
}

/// Core trait for block-processing graph nodes
///
/// Nodes own their inputs. A scheduler prepares and processes inputs before
/// the nodes that read them, so by the time `process` runs every input's
/// `output()` holds the current block.
pub trait Node: Send {
    /// May change when the graph is rebuilt, but not between blocks
    fn properties(&self) -> NodeProperties;

    /// Allocate everything `process` will need. Called off the audio thread.
    fn prepare(&mut self, info: &PrepareInfo);

    /// Produce the output for `range`. Must not allocate, lock or block.
    fn process(&mut self, range: SampleRange);

    /// The output written by the last `process` call
    fn output(&self) -> &NodeBuffers;

    /// Call `f` on each direct input
    ///
    /// Default implementation has no inputs (source nodes).
    fn visit_inputs(&mut self, _f: &mut dyn FnMut(&mut dyn Node)) {}
}

/// Allow boxed nodes to be used as nodes (for dynamic dispatch)
impl Node for Box<dyn Node> {
    fn properties(&self) -> NodeProperties {
        (**self).properties()
    }

    fn prepare(&mut self, info: &PrepareInfo) {
        (**self).prepare(info)
    }

    fn process(&mut self, range: SampleRange) {
        (**self).process(range)
    }

    fn output(&self) -> &NodeBuffers {
        (**self).output()
    }

    fn visit_inputs(&mut self, f: &mut dyn FnMut(&mut dyn Node)) {
        (**self).visit_inputs(f)
    }
}
