//! Shared state types for UI communication
//!
//! The audio thread only ever sends `Copy` snapshots. Controls go the other
//! way through atomics owned by the transport and the effect units.

use std::sync::Arc;

use effect_node::{
    effects::{DelayEffect, FilterEffect},
    transport::{PlayHead, TrackMuteState},
};

/// Static state gathered once before the stream starts
#[derive(Clone, Debug)]
pub struct UiStateInit {
    pub sample_rate: f32,
    pub block_size: usize,
    /// Latency reported by the root of the graph
    pub latency_samples: usize,
    pub filter_id: u64,
    pub delay_id: u64,
}

/// Snapshot pushed by the audio thread after every callback
#[derive(Clone, Copy, Debug, Default)]
pub struct UiStateUpdate {
    pub reference_position: i64,
    pub timeline_position: i64,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_muted: bool,
}

/// Handles the UI uses to steer playback
pub struct Controls {
    pub playhead: Arc<PlayHead>,
    pub mute: Arc<TrackMuteState>,
    pub filter: Arc<FilterEffect>,
    pub delay: Arc<DelayEffect>,
}
