#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MIDI_BUFFER_CAPACITY;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }

    /// Key number for note events
    pub fn key(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { key, .. } | MidiEvent::NoteOff { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self, MidiEvent::NoteOn { .. })
    }
}

/// A MIDI event stamped with its offset (seconds) from the start of the block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedMidiEvent {
    pub offset: f64,
    pub event: MidiEvent,
}

impl TimedMidiEvent {
    pub fn new(offset: f64, event: MidiEvent) -> Self {
        Self { offset, event }
    }
}

/// Per-block MIDI event list.
///
/// `all_notes_off` asks every consumer to silence sounding notes before
/// handling the events in this block.
#[derive(Debug, Clone, Default)]
pub struct MidiBuffer {
    events: Vec<TimedMidiEvent>,
    pub all_notes_off: bool,
}

impl MidiBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MIDI_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            all_notes_off: false,
        }
    }

    /// Make sure at least `capacity` events fit without reallocating
    pub fn reserve(&mut self, capacity: usize) {
        self.events
            .reserve(capacity.saturating_sub(self.events.len()));
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push(&mut self, event: TimedMidiEvent) {
        self.events.push(event);
    }

    /// Drop all events and reset the all-notes-off flag
    pub fn clear(&mut self) {
        self.events.clear();
        self.all_notes_off = false;
    }

    /// Replace this buffer's content (events and flag) with `other`'s.
    ///
    /// Never reallocates: events beyond this buffer's capacity are dropped.
    /// Returns how many events were copied.
    pub fn copy_from(&mut self, other: &MidiBuffer) -> usize {
        let count = other.events.len().min(self.events.capacity());
        self.events.clear();
        self.events.extend_from_slice(&other.events[..count]);
        self.all_notes_off = other.all_notes_off;
        count
    }

    pub fn events(&self) -> &[TimedMidiEvent] {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut [TimedMidiEvent] {
        &mut self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedMidiEvent> {
        self.events.iter()
    }
}
