use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::graph::effect::TransportInfo;

/// Supplies the transport part of a render context when a node is not tied
/// to the timeline (e.g. previewing a unit on its own).
pub trait RenderContextProvider: Send + Sync {
    fn current_context(&self) -> TransportInfo;
}

/// Provider returning a fixed context, with atomically adjustable time and
/// play state so a preview can be started, stopped and re-positioned.
#[derive(Debug)]
pub struct FixedContext {
    edit_time_bits: AtomicU64,
    playing: AtomicBool,
    rendering: bool,
}

impl FixedContext {
    pub fn new(info: TransportInfo) -> Self {
        Self {
            edit_time_bits: AtomicU64::new(info.edit_time.to_bits()),
            playing: AtomicBool::new(info.is_playing),
            rendering: info.is_rendering,
        }
    }

    /// A playing preview starting at time zero
    pub fn preview() -> Self {
        Self::new(TransportInfo {
            is_playing: true,
            ..TransportInfo::default()
        })
    }

    pub fn set_edit_time(&self, seconds: f64) {
        self.edit_time_bits
            .store(seconds.to_bits(), Ordering::Release);
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }
}

impl RenderContextProvider for FixedContext {
    fn current_context(&self) -> TransportInfo {
        TransportInfo {
            edit_time: f64::from_bits(self.edit_time_bits.load(Ordering::Acquire)),
            is_playing: self.playing.load(Ordering::Acquire),
            is_scrubbing: false,
            is_rendering: self.rendering,
            allow_bypassed_processing: false,
        }
    }
}
