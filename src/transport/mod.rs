//! Timeline and track-state collaborators read by effect nodes.
//!
//! Nodes only ever *read* these objects from the audio thread. The concrete
//! implementations keep their state in atomics, so control threads can
//! request changes at any time; requests are latched once per block through
//! [`BlockState::begin_block`], which keeps every node in a graph looking at
//! the same state for the whole block.

/// Track mute policy and its atomic implementation.
pub mod mute;
/// Reference-sample to timeline mapping and transport flags.
pub mod playhead;
/// Context sources for rendering outside the timeline.
pub mod provider;

use crate::time::SampleRange;

pub use mute::{MuteState, TrackMuteState};
pub use playhead::{PlayHead, Playhead};
pub use provider::{FixedContext, RenderContextProvider};

/// Per-block state that must be latched before any node processes the block.
pub trait BlockState: Send + Sync {
    fn begin_block(&self, range: SampleRange);
}
