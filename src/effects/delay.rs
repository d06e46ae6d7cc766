use std::sync::{Mutex, PoisonError};

use log::debug;

use crate::{
    dsp::delay::DelayLine,
    effects::EffectCore,
    graph::effect::{EffectUnit, RenderContext},
    params::{BoolParameter, FloatParameter},
};

/// Longest delay time the unit allocates for
pub const MAX_DELAY_MS: f32 = 2000.0;

/// Feedback delay, one line per channel.
#[derive(Debug)]
pub struct DelayEffect {
    core: EffectCore,
    num_channels: usize,
    lines: Mutex<Vec<DelayLine>>,
    pub time_ms: FloatParameter,
    pub feedback: FloatParameter,
    pub mix: FloatParameter,
}

impl DelayEffect {
    pub fn new(num_channels: usize, time_ms: f32) -> Self {
        Self {
            core: EffectCore::new(),
            num_channels,
            lines: Mutex::new(Vec::new()),
            time_ms: FloatParameter::new("time", 1.0, MAX_DELAY_MS, time_ms),
            feedback: FloatParameter::new("feedback", 0.0, 0.95, 0.35),
            mix: FloatParameter::new("mix", 0.0, 1.0, 0.5),
        }
    }

    pub fn with_feedback(self, feedback: f32) -> Self {
        self.feedback.set(feedback);
        self
    }

    pub fn with_mix(self, mix: f32) -> Self {
        self.mix.set(mix);
        self
    }

    fn delay_samples(&self) -> usize {
        let samples = self.time_ms.get() as f64 * self.core.sample_rate() / 1000.0;
        (samples.round() as usize).max(1)
    }
}

impl EffectUnit for DelayEffect {
    fn id(&self) -> u64 {
        self.core.id()
    }

    fn initialize(&self, sample_rate: f64, _block_size: usize) {
        let max_samples = (MAX_DELAY_MS as f64 * sample_rate / 1000.0).ceil() as usize;
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        *lines = (0..self.num_channels)
            .map(|_| DelayLine::new(max_samples))
            .collect();
        self.core.mark_initialised(sample_rate);
        debug!(
            "delay {} initialised: {} lines of {} samples",
            self.core.id(),
            self.num_channels,
            max_samples
        );
    }

    fn deinitialize(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.core.mark_deinitialised();
    }

    fn needs_initializing(&self) -> bool {
        self.core.needs_initializing()
    }

    fn apply(&self, context: &mut RenderContext<'_>) {
        let Ok(mut lines) = self.lines.try_lock() else {
            return;
        };

        if context.midi.all_notes_off {
            // Tails from before a jump would otherwise ring over the new position
            lines.iter_mut().for_each(DelayLine::reset);
        }

        let delay = self.delay_samples();
        let feedback = self.feedback.get();
        let mix = self.mix.get();
        let frames = context.frame_range();

        for (line, channel) in lines.iter_mut().zip(context.dest_buffer.channels_mut()) {
            for sample in &mut channel[frames.clone()] {
                let dry = *sample;
                let wet = line.read(delay);
                line.write(dry + wet * feedback);
                *sample = dry * (1.0 - mix) + wet * mix;
            }
        }
    }

    fn enabled_param(&self) -> &BoolParameter {
        self.core.enabled()
    }

    fn audio_input_count(&self) -> usize {
        self.num_channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buffer::{AudioBlock, ChannelLayout, MidiBuffer},
        graph::effect::TransportInfo,
    };

    fn render(effect: &DelayEffect, audio: &mut AudioBlock, midi: &mut MidiBuffer) {
        let frames = audio.num_frames();
        let mut context = RenderContext {
            dest_buffer: audio,
            dest_layout: ChannelLayout::Mono,
            buffer_start_sample: 0,
            buffer_num_samples: frames,
            midi,
            midi_buffer_offset: 0.0,
            transport: TransportInfo::default(),
        };
        effect.apply(&mut context);
    }

    #[test]
    fn echoes_impulse_after_delay_time() {
        // 10 ms at 1 kHz is 10 samples
        let effect = DelayEffect::new(1, 10.0).with_feedback(0.0).with_mix(1.0);
        effect.initialize(1000.0, 32);

        let mut impulse = vec![0.0; 32];
        impulse[0] = 1.0;
        let mut audio = AudioBlock::from_channels(vec![impulse]);
        render(&effect, &mut audio, &mut MidiBuffer::new());

        let channel = audio.channel(0);
        assert_eq!(channel[10], 1.0);
        assert_eq!(channel.iter().filter(|s| **s != 0.0).count(), 1);
    }

    #[test]
    fn passes_through_before_initialisation() {
        let effect = DelayEffect::new(1, 10.0).with_mix(1.0);
        let mut audio = AudioBlock::from_channels(vec![vec![0.5; 8]]);
        render(&effect, &mut audio, &mut MidiBuffer::new());
        assert_eq!(audio.channel(0), &[0.5; 8]);
    }

    #[test]
    fn all_notes_off_clears_tail() {
        let effect = DelayEffect::new(1, 10.0).with_feedback(0.0).with_mix(1.0);
        effect.initialize(1000.0, 8);

        let mut audio = AudioBlock::from_channels(vec![vec![1.0; 8]]);
        render(&effect, &mut audio, &mut MidiBuffer::new());

        let mut silence = AudioBlock::from_channels(vec![vec![0.0; 8]]);
        let mut midi = MidiBuffer::new();
        midi.all_notes_off = true;
        render(&effect, &mut silence, &mut midi);

        assert_eq!(silence.peak(), 0.0);
    }

    #[test]
    fn deinitialize_releases_lines() {
        let effect = DelayEffect::new(2, 10.0);
        effect.initialize(48_000.0, 64);
        assert!(!effect.needs_initializing());

        effect.deinitialize();
        assert!(effect.needs_initializing());
        assert!(effect.lines.lock().unwrap().is_empty());
    }
}
