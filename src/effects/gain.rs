use crate::{
    effects::EffectCore,
    graph::effect::{EffectUnit, RenderContext},
    params::{BoolParameter, FloatParameter},
};

/// Multiplies every channel by a gain factor. Stateless, so it never skips.
#[derive(Debug)]
pub struct GainEffect {
    core: EffectCore,
    num_channels: usize,
    pub gain: FloatParameter,
}

impl GainEffect {
    pub fn new(num_channels: usize, gain: f32) -> Self {
        Self {
            core: EffectCore::new(),
            num_channels,
            gain: FloatParameter::new("gain", 0.0, 4.0, gain),
        }
    }
}

impl EffectUnit for GainEffect {
    fn id(&self) -> u64 {
        self.core.id()
    }

    fn initialize(&self, sample_rate: f64, _block_size: usize) {
        self.core.mark_initialised(sample_rate);
    }

    fn deinitialize(&self) {
        self.core.mark_deinitialised();
    }

    fn needs_initializing(&self) -> bool {
        self.core.needs_initializing()
    }

    fn apply(&self, context: &mut RenderContext<'_>) {
        let gain = self.gain.get();
        let frames = context.frame_range();
        for channel in context.dest_buffer.channels_mut() {
            for sample in &mut channel[frames.clone()] {
                *sample *= gain;
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
