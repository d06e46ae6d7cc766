/// Circular delay line with a fixed maximum length.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Delay line able to hold up to `max_delay_samples` of history
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1) + 1],
            write_pos: 0,
        }
    }

    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Sample written `delay_samples` writes ago (1 = the most recent)
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1, len - 1);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Fractional read with linear interpolation
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let max = self.max_delay() as f32;
        let delay = delay_samples.clamp(1.0, max);
        let whole = delay.floor();
        let frac = delay - whole;

        let a = self.read(whole as usize);
        let b = self.read((whole as usize + 1).min(self.max_delay()));
        a + (b - a) * frac
    }

    /// Push `sample` and return the sample from `delay_samples` ago
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        let delay = delay_samples.min(self.max_delay());
        if delay == 0 {
            return sample;
        }
        let delayed = self.read(delay);
        self.write(sample);
        delayed
    }

    pub fn render(&mut self, buffer: &mut [f32], delay_samples: usize) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_impulse_by_requested_samples() {
        let mut line = DelayLine::new(16);
        let mut buffer = vec![0.0; 12];
        buffer[0] = 1.0;

        line.render(&mut buffer, 5);

        assert_eq!(buffer[5], 1.0);
        assert_eq!(buffer.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn zero_delay_is_identity() {
        let mut line = DelayLine::new(8);
        let mut buffer = vec![0.5, -0.25, 1.0];
        line.render(&mut buffer, 0);
        assert_eq!(buffer, vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn interpolates_between_neighbours() {
        let mut line = DelayLine::new(8);
        line.write(0.0);
        line.write(1.0);

        assert_eq!(line.read(1), 1.0);
        assert_eq!(line.read(2), 0.0);
        assert!((line.read_interpolated(1.5) - 0.5).abs() < 1e-6);
    }
}
