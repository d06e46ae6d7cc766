use std::sync::{Mutex, PoisonError};

use crate::{
    buffer::MidiEvent,
    effects::EffectCore,
    graph::effect::{EffectUnit, RenderContext},
    params::{BoolParameter, FloatParameter},
};

const NUM_CHANNELS: usize = 16;
const NUM_KEYS: usize = 128;

/// Shifts note events by a number of semitones.
///
/// The key each note-on was sent as is remembered, so its note-off still
/// matches after the transposition changes mid-note.
#[derive(Debug)]
pub struct TransposeEffect {
    core: EffectCore,
    sounding: Mutex<Vec<Option<u8>>>,
    pub semitones: FloatParameter,
}

impl TransposeEffect {
    pub fn new(semitones: i8) -> Self {
        Self {
            core: EffectCore::new(),
            sounding: Mutex::new(vec![None; NUM_CHANNELS * NUM_KEYS]),
            semitones: FloatParameter::new("semitones", -48.0, 48.0, semitones as f32),
        }
    }

    fn shift(&self, key: u8) -> u8 {
        let shifted = key as i32 + self.semitones.get().round() as i32;
        shifted.clamp(0, NUM_KEYS as i32 - 1) as u8
    }
}

fn slot(channel: u8, key: u8) -> usize {
    (channel as usize % NUM_CHANNELS) * NUM_KEYS + (key as usize % NUM_KEYS)
}

impl EffectUnit for TransposeEffect {
    fn id(&self) -> u64 {
        self.core.id()
    }

    fn initialize(&self, sample_rate: f64, _block_size: usize) {
        self.sounding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill(None);
        self.core.mark_initialised(sample_rate);
    }

    fn deinitialize(&self) {
        self.core.mark_deinitialised();
    }

    fn needs_initializing(&self) -> bool {
        self.core.needs_initializing()
    }

    fn apply(&self, context: &mut RenderContext<'_>) {
        let Ok(mut sounding) = self.sounding.try_lock() else {
            return;
        };

        if context.midi.all_notes_off {
            sounding.fill(None);
        }

        for timed in context.midi.events_mut() {
            match &mut timed.event {
                MidiEvent::NoteOn { channel, key, .. } => {
                    let shifted = self.shift(*key);
                    sounding[slot(*channel, *key)] = Some(shifted);
                    *key = shifted;
                }
                MidiEvent::NoteOff { channel, key, .. } => {
                    *key = sounding[slot(*channel, *key)]
                        .take()
                        .unwrap_or_else(|| self.shift(*key));
                }
                _ => {}
            }
        }
    }

    fn enabled_param(&self) -> &BoolParameter {
        self.core.enabled()
    }

    fn midi_input_count(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buffer::{AudioBlock, ChannelLayout, MidiBuffer, TimedMidiEvent},
        graph::effect::TransportInfo,
    };

    fn note_on(key: u8) -> TimedMidiEvent {
        TimedMidiEvent::new(0.0, MidiEvent::NoteOn { channel: 0, key, velocity: 100 })
    }

    fn note_off(key: u8) -> TimedMidiEvent {
        TimedMidiEvent::new(0.0, MidiEvent::NoteOff { channel: 0, key, velocity: 0 })
    }

    fn render(effect: &TransposeEffect, midi: &mut MidiBuffer) {
        let mut audio = AudioBlock::new(0, 0);
        let mut context = RenderContext {
            dest_buffer: &mut audio,
            dest_layout: ChannelLayout::Disabled,
            buffer_start_sample: 0,
            buffer_num_samples: 0,
            midi,
            midi_buffer_offset: 0.0,
            transport: TransportInfo::default(),
        };
        effect.apply(&mut context);
    }

    fn keys(midi: &MidiBuffer) -> Vec<u8> {
        midi.iter().filter_map(|e| e.event.key()).collect()
    }

    #[test]
    fn shifts_notes_and_leaves_other_events() {
        let effect = TransposeEffect::new(12);
        let mut midi = MidiBuffer::new();
        midi.push(note_on(60));
        midi.push(TimedMidiEvent::new(
            0.0,
            MidiEvent::ControlChange { channel: 0, controller: 1, value: 64 },
        ));

        render(&effect, &mut midi);

        assert_eq!(keys(&midi), vec![72]);
        assert!(matches!(midi.events()[1].event, MidiEvent::ControlChange { value: 64, .. }));
    }

    #[test]
    fn note_off_follows_its_note_on() {
        let effect = TransposeEffect::new(5);
        let mut midi = MidiBuffer::new();
        midi.push(note_on(60));
        render(&effect, &mut midi);

        effect.semitones.set(-3.0);
        let mut midi = MidiBuffer::new();
        midi.push(note_off(60));
        render(&effect, &mut midi);

        assert_eq!(keys(&midi), vec![65]);
    }

    #[test]
    fn all_notes_off_forgets_sounding_notes() {
        let effect = TransposeEffect::new(2);
        let mut midi = MidiBuffer::new();
        midi.push(note_on(60));
        render(&effect, &mut midi);

        effect.semitones.set(7.0);
        let mut midi = MidiBuffer::new();
        midi.all_notes_off = true;
        midi.push(note_off(60));
        render(&effect, &mut midi);

        assert_eq!(keys(&midi), vec![67]);
    }

    #[test]
    fn clamps_to_midi_key_range() {
        let effect = TransposeEffect::new(24);
        let mut midi = MidiBuffer::new();
        midi.push(note_on(120));
        render(&effect, &mut midi);
        assert_eq!(keys(&midi), vec![127]);
    }
}
