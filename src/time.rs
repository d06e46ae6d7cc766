//! Sample/second conversions and block ranges.

/// Half-open range of reference samples `[start, end)` covered by one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleRange {
    pub start: i64,
    pub end: i64,
}

impl SampleRange {
    pub fn new(start: i64, end: i64) -> Self {
        debug_assert!(end >= start);
        Self { start, end }
    }

    /// Range of `len` samples starting at `start`
    pub fn with_length(start: i64, len: usize) -> Self {
        Self::new(start, start + len as i64)
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// The range directly following this one with the same length
    pub fn next(&self) -> Self {
        Self::with_length(self.end, self.len())
    }
}

#[inline]
pub fn sample_to_time(samples: i64, sample_rate: f64) -> f64 {
    samples as f64 / sample_rate
}

#[inline]
pub fn time_to_sample(seconds: f64, sample_rate: f64) -> i64 {
    (seconds * sample_rate).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_samples_and_seconds() {
        assert_eq!(sample_to_time(48_000, 48_000.0), 1.0);
        assert_eq!(sample_to_time(-24_000, 48_000.0), -0.5);
        assert_eq!(time_to_sample(0.25, 44_100.0), 11_025);
    }

    #[test]
    fn range_length_and_successor() {
        let range = SampleRange::with_length(1_000, 256);
        assert_eq!(range.len(), 256);
        assert!(!range.is_empty());

        let next = range.next();
        assert_eq!(next.start, 1_256);
        assert_eq!(next.len(), 256);
    }
}
