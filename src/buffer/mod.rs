//! Buffers that flow between graph nodes.
//!
//! Everything here is sized once, outside the audio callback, and then reused
//! block after block. Copy helpers never grow an allocation as long as the
//! content fits the capacity that was reserved at prepare time.

/// Planar multi-channel audio storage and channel layouts.
pub mod audio;
/// MIDI events with block-relative timestamps.
pub mod midi;

pub use audio::{AudioBlock, ChannelLayout};
pub use midi::{MidiBuffer, MidiEvent, TimedMidiEvent};
