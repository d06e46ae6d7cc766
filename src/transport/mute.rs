use std::sync::atomic::{AtomicBool, Ordering};

use crate::{time::SampleRange, transport::BlockState};

/// Decides whether a track's contents run and whether they are heard.
pub trait MuteState: Send + Sync {
    /// Whether nodes on the track should run at all this block
    fn should_track_contents_be_processed(&self) -> bool;

    fn should_track_be_audible(&self) -> bool;

    /// True only for the block in which the track became muted
    fn was_just_muted(&self) -> bool;
}

/// Atomic mute switch for one track.
///
/// `set_muted` may be called from any thread; the change takes effect (and
/// the muting edge is reported) at the next [`BlockState::begin_block`].
#[derive(Debug, Default)]
pub struct TrackMuteState {
    requested_muted: AtomicBool,
    process_while_muted: AtomicBool,
    muted: AtomicBool,
    just_muted: AtomicBool,
    just_unmuted: AtomicBool,
}

impl TrackMuteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_muted(&self, muted: bool) {
        self.requested_muted.store(muted, Ordering::Release);
    }

    /// Toggle the requested mute state, returning the new request
    pub fn toggle_muted(&self) -> bool {
        !self.requested_muted.fetch_xor(true, Ordering::AcqRel)
    }

    /// Keep running the track's nodes while muted (e.g. to keep delay tails warm)
    pub fn set_process_while_muted(&self, process: bool) {
        self.process_while_muted.store(process, Ordering::Release);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    pub fn was_just_unmuted(&self) -> bool {
        self.just_unmuted.load(Ordering::Acquire)
    }
}

impl BlockState for TrackMuteState {
    fn begin_block(&self, _range: SampleRange) {
        let now = self.requested_muted.load(Ordering::Acquire);
        let before = self.muted.swap(now, Ordering::AcqRel);

        self.just_muted.store(now && !before, Ordering::Release);
        self.just_unmuted.store(!now && before, Ordering::Release);
    }
}

impl MuteState for TrackMuteState {
    fn should_track_contents_be_processed(&self) -> bool {
        !self.is_muted() || self.process_while_muted.load(Ordering::Acquire)
    }

    fn should_track_be_audible(&self) -> bool {
        !self.is_muted()
    }

    fn was_just_muted(&self) -> bool {
        self.just_muted.load(Ordering::Acquire)
    }
}
