/// Canonical speaker arrangement for a number of channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Disabled,
    Mono,
    Stereo,
    Discrete(usize),
}

impl ChannelLayout {
    pub fn canonical(num_channels: usize) -> Self {
        match num_channels {
            0 => ChannelLayout::Disabled,
            1 => ChannelLayout::Mono,
            2 => ChannelLayout::Stereo,
            n => ChannelLayout::Discrete(n),
        }
    }

    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Disabled => 0,
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
            ChannelLayout::Discrete(n) => *n,
        }
    }
}

/// Planar audio buffer with a fixed frame capacity.
///
/// The active frame count can be lowered for a short block (e.g. the tail of
/// a device callback) without touching the allocation.
#[derive(Debug, Clone, Default)]
pub struct AudioBlock {
    channels: Vec<Vec<f32>>,
    num_frames: usize,
}

impl AudioBlock {
    /// Allocate `num_channels` silent channels of `capacity` frames each
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            channels: (0..num_channels).map(|_| vec![0.0; capacity]).collect(),
            num_frames: capacity,
        }
    }

    /// Build a block from per-channel sample vectors (all the same length)
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Self {
        let num_frames = channels.first().map(Vec::len).unwrap_or_default();
        assert!(
            channels.iter().all(|c| c.len() == num_frames),
            "all channels must have the same length"
        );
        Self {
            channels,
            num_frames,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn capacity(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or_default()
    }

    /// Change the active frame count. Never reallocates.
    pub fn set_num_frames(&mut self, num_frames: usize) {
        assert!(
            self.channels.is_empty() || num_frames <= self.capacity(),
            "block of {num_frames} frames exceeds prepared capacity {}",
            self.capacity()
        );
        self.num_frames = num_frames;
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index][..self.num_frames]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        let frames = self.num_frames;
        &mut self.channels[index][..frames]
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        let frames = self.num_frames;
        self.channels.iter().map(move |c| &c[..frames])
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let frames = self.num_frames;
        self.channels.iter_mut().map(move |c| &mut c[..frames])
    }

    pub fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(0.0);
        }
    }

    /// Copy the first `count` channels of `source` over the same channels here.
    ///
    /// Both blocks must be at the same frame count.
    pub fn copy_channels_from(&mut self, source: &AudioBlock, count: usize) {
        assert_eq!(
            source.num_frames, self.num_frames,
            "source and destination frame counts differ"
        );
        let frames = self.num_frames;
        for (dst, src) in self.channels.iter_mut().zip(&source.channels).take(count) {
            dst[..frames].copy_from_slice(&src[..frames]);
        }
    }

    /// Largest absolute sample across all active channels
    pub fn peak(&self) -> f32 {
        self.channels()
            .flat_map(|c| c.iter())
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }
}
