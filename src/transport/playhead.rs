use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::{time::SampleRange, transport::BlockState};

/*
Playhead
========

The graph runs on a free-running *reference* sample counter: every block
covers the next `[start, end)` of reference samples whether or not the
transport is rolling. The playhead maps those reference samples onto the
*timeline* (the position inside the edit) and reports transport flags.

  reference:  0 ─────── 512 ─────── 1024 ────── 1536 ──────
  timeline:   (stopped at 0)        ▶ play      0 ─────── 512
                                    anchor: reference 1024 = timeline 0

While playing:   timeline = anchor_timeline + (reference - anchor_reference)
While stopped:   timeline = anchor_timeline (frozen)
While looping:   positions past the loop end fold back into the loop range

A "jump" is any discontinuity in that mapping: a seek, or the block in which
the loop wraps. Downstream MIDI consumers need to know, otherwise notes
started before the jump are never released.
*/

/// Read-only view of the transport used while processing a block.
pub trait Playhead: Send + Sync {
    /// Map a reference sample index to a timeline sample index
    fn reference_sample_to_timeline(&self, reference_sample: i64) -> i64;

    fn is_playing(&self) -> bool;

    /// The user is dragging the playhead (scrubbing) rather than playing
    fn is_user_scrubbing(&self) -> bool;

    /// True only for the block in which the timeline position jumped
    fn did_just_jump(&self) -> bool;
}

const NONE: i64 = i64::MIN;

/// Atomic transport implementation of [`Playhead`].
///
/// Control methods (`play`, `seek`, `set_loop`, ...) may be called from any
/// thread; they are applied at the next [`BlockState::begin_block`].
#[derive(Debug)]
pub struct PlayHead {
    // Requested by control threads
    requested_playing: AtomicBool,
    pending_seek: AtomicI64,
    requested_loop_start: AtomicI64,
    requested_loop_end: AtomicI64,
    loop_changed: AtomicBool,
    scrubbing: AtomicBool,

    // Latched by the audio thread in begin_block
    playing: AtomicBool,
    anchor_reference: AtomicI64,
    anchor_timeline: AtomicI64,
    loop_start: AtomicI64,
    loop_end: AtomicI64,
    last_loop_iteration: AtomicI64,
    jumped: AtomicBool,
    position: AtomicI64,
}

impl Default for PlayHead {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayHead {
    /// A stopped playhead parked at timeline position 0
    pub fn new() -> Self {
        Self {
            requested_playing: AtomicBool::new(false),
            pending_seek: AtomicI64::new(NONE),
            requested_loop_start: AtomicI64::new(0),
            requested_loop_end: AtomicI64::new(0),
            loop_changed: AtomicBool::new(false),
            scrubbing: AtomicBool::new(false),
            playing: AtomicBool::new(false),
            anchor_reference: AtomicI64::new(0),
            anchor_timeline: AtomicI64::new(0),
            loop_start: AtomicI64::new(0),
            loop_end: AtomicI64::new(0),
            last_loop_iteration: AtomicI64::new(NONE),
            jumped: AtomicBool::new(false),
            position: AtomicI64::new(0),
        }
    }

    pub fn play(&self) {
        self.requested_playing.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.requested_playing.store(false, Ordering::Release);
    }

    /// Toggle play/stop, returning the requested state
    pub fn toggle_playback(&self) -> bool {
        !self.requested_playing.fetch_xor(true, Ordering::AcqRel)
    }

    /// Move the playhead to a timeline sample. Reported as a jump.
    pub fn seek(&self, timeline_sample: i64) {
        self.pending_seek
            .store(timeline_sample.max(0), Ordering::Release);
    }

    /// Loop `[start, end)` on the timeline, or disable looping with `None`
    pub fn set_loop(&self, range: Option<(i64, i64)>) {
        let (start, end) = range.unwrap_or((0, 0));
        self.requested_loop_start.store(start, Ordering::Relaxed);
        self.requested_loop_end.store(end, Ordering::Relaxed);
        self.loop_changed.store(true, Ordering::Release);
    }

    pub fn set_user_scrubbing(&self, scrubbing: bool) {
        self.scrubbing.store(scrubbing, Ordering::Release);
    }

    pub fn is_looping(&self) -> bool {
        self.loop_end.load(Ordering::Acquire) > self.loop_start.load(Ordering::Acquire)
    }

    /// Timeline position at the start of the most recent block
    pub fn position(&self) -> i64 {
        self.position.load(Ordering::Acquire)
    }

    fn unlooped(&self, reference_sample: i64) -> i64 {
        let anchor_timeline = self.anchor_timeline.load(Ordering::Acquire);
        if !self.playing.load(Ordering::Acquire) {
            return anchor_timeline;
        }
        anchor_timeline + (reference_sample - self.anchor_reference.load(Ordering::Acquire))
    }

    fn loop_bounds(&self) -> Option<(i64, i64)> {
        let start = self.loop_start.load(Ordering::Acquire);
        let end = self.loop_end.load(Ordering::Acquire);
        (end > start).then_some((start, end))
    }

    fn loop_iteration(&self, timeline_sample: i64) -> i64 {
        match self.loop_bounds() {
            Some((start, end)) if timeline_sample >= start => {
                (timeline_sample - start).div_euclid(end - start)
            }
            _ => NONE,
        }
    }

    fn anchor(&self, reference_sample: i64, timeline_sample: i64) {
        self.anchor_reference
            .store(reference_sample, Ordering::Release);
        self.anchor_timeline.store(timeline_sample, Ordering::Release);
        self.last_loop_iteration.store(NONE, Ordering::Release);
    }
}

impl BlockState for PlayHead {
    fn begin_block(&self, range: SampleRange) {
        let mut jumped = false;
        let current = self.reference_sample_to_timeline(range.start);

        if self.loop_changed.swap(false, Ordering::AcqRel) {
            self.loop_start.store(
                self.requested_loop_start.load(Ordering::Relaxed),
                Ordering::Release,
            );
            self.loop_end.store(
                self.requested_loop_end.load(Ordering::Relaxed),
                Ordering::Release,
            );
            self.anchor(range.start, current);
            // Only a discontinuity counts, e.g. the new loop end lies behind us
            jumped = self.reference_sample_to_timeline(range.start) != current;
        }

        let requested = self.requested_playing.load(Ordering::Acquire);
        if requested != self.playing.load(Ordering::Acquire) {
            self.anchor(range.start, current);
            self.playing.store(requested, Ordering::Release);
        }

        let seek = self.pending_seek.swap(NONE, Ordering::AcqRel);
        if seek != NONE {
            self.anchor(range.start, seek);
            jumped = true;
        }

        // Loop wrap inside this block
        if self.playing.load(Ordering::Acquire) && !range.is_empty() {
            let iteration = self.loop_iteration(self.unlooped(range.end - 1));
            let previous = self.last_loop_iteration.swap(iteration, Ordering::AcqRel);
            if previous != NONE && iteration != previous {
                jumped = true;
            }
        }

        self.jumped.store(jumped, Ordering::Release);
        self.position.store(
            self.reference_sample_to_timeline(range.start),
            Ordering::Release,
        );
    }
}

impl Playhead for PlayHead {
    fn reference_sample_to_timeline(&self, reference_sample: i64) -> i64 {
        let position = self.unlooped(reference_sample);
        match self.loop_bounds() {
            Some((start, end)) if position >= end => {
                start + (position - start).rem_euclid(end - start)
            }
            _ => position,
        }
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn is_user_scrubbing(&self) -> bool {
        self.scrubbing.load(Ordering::Acquire)
    }

    fn did_just_jump(&self) -> bool {
        self.jumped.load(Ordering::Acquire)
    }
}
