use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    buffer::{AudioBlock, ChannelLayout, MidiBuffer},
    params::BoolParameter,
};

/// Where the block sits on the timeline and what the transport is doing.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransportInfo {
    /// Timeline position of the block start in seconds
    pub edit_time: f64,
    pub is_playing: bool,
    pub is_scrubbing: bool,
    /// Offline render instead of live playback
    pub is_rendering: bool,
    /// Run the unit even though its track would normally bypass it
    pub allow_bypassed_processing: bool,
}

/// Everything an effect unit needs to process one block.
///
/// Built fresh for every block and dropped right after `apply` returns.
#[derive(Debug)]
pub struct RenderContext<'a> {
    /// Audio to process in place
    pub dest_buffer: &'a mut AudioBlock,
    pub dest_layout: ChannelLayout,
    pub buffer_start_sample: usize,
    pub buffer_num_samples: usize,
    /// MIDI to read and/or rewrite in place
    pub midi: &'a mut MidiBuffer,
    /// Seconds to add to MIDI timestamps to get block-relative times
    pub midi_buffer_offset: f64,
    pub transport: TransportInfo,
}

impl RenderContext<'_> {
    /// Frames of `dest_buffer` this render covers
    pub fn frame_range(&self) -> std::ops::Range<usize> {
        self.buffer_start_sample..self.buffer_start_sample + self.buffer_num_samples
    }
}

/// An automatable signal processor hosted by an effect node.
///
/// Units are shared (the edit model, UI and graph all hold them), so every
/// method takes `&self`. `apply` runs on the audio thread: implementations
/// must not block there. Keep DSP state behind a `try_lock` or in atomics and
/// pass audio through untouched when the state is momentarily unavailable.
pub trait EffectUnit: Send + Sync {
    /// Stable item id; becomes the hosting node's id
    fn id(&self) -> u64;

    fn initialize(&self, sample_rate: f64, block_size: usize);

    fn deinitialize(&self);

    /// True while the unit is not initialised (never was, or was deinitialised)
    fn needs_initializing(&self) -> bool;

    /// Process one block in place
    fn apply(&self, context: &mut RenderContext<'_>);

    /// The unit's on/off switch
    fn enabled_param(&self) -> &BoolParameter;

    fn audio_input_count(&self) -> usize {
        0
    }

    fn midi_input_count(&self) -> usize {
        0
    }

    /// Processing delay the unit adds, in samples
    fn latency_samples(&self) -> usize {
        0
    }
}

/// Reference-counted handle to an effect unit.
pub type SharedEffect = Arc<dyn EffectUnit>;
