use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Saw,
    Square,
}

/// Phase-accumulator oscillator (naive, not band-limited).
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: OscillatorWaveform,
    phase: f32, // 0.0..1.0
}

impl Oscillator {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    #[inline]
    pub fn next_sample(&mut self, increment: f32) -> f32 {
        let value = match self.waveform {
            OscillatorWaveform::Sine => (self.phase * TAU).sin(),
            OscillatorWaveform::Saw => 2.0 * self.phase - 1.0,
            OscillatorWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        self.phase += increment;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        value
    }

    /// Overwrite `destination` with the waveform at `frequency`
    pub fn render(&mut self, destination: &mut [f32], frequency: f32, sample_rate: f32) {
        let increment = frequency / sample_rate;
        for sample in destination.iter_mut() {
            *sample = self.next_sample(increment);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_stays_in_range() {
        let mut osc = Oscillator::new(OscillatorWaveform::Sine);
        let mut buffer = vec![0.0; 512];
        osc.render(&mut buffer, 440.0, 48_000.0);

        assert!(buffer.iter().all(|s| s.abs() <= 1.0));
        assert!(buffer.iter().any(|s| s.abs() > 0.9));
    }

    #[test]
    fn square_alternates_at_frequency() {
        let mut osc = Oscillator::new(OscillatorWaveform::Square);
        let mut buffer = vec![0.0; 8];
        // Period of 4 samples
        osc.render(&mut buffer, 12_000.0, 48_000.0);

        assert_eq!(buffer, vec![1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn reset_restarts_phase() {
        let mut osc = Oscillator::new(OscillatorWaveform::Saw);
        let mut buffer = vec![0.0; 3];
        osc.render(&mut buffer, 1_000.0, 48_000.0);
        osc.reset();

        assert_eq!(osc.next_sample(0.0), -1.0);
    }
}
