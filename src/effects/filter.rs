use std::sync::{Mutex, PoisonError};

use crate::{
    dsp::filter::{FilterType, SVFilter, MAX_RESONANCE},
    effects::EffectCore,
    graph::effect::{EffectUnit, RenderContext},
    params::{BoolParameter, FloatParameter},
};

/// State-variable filter, one instance per channel.
#[derive(Debug)]
pub struct FilterEffect {
    core: EffectCore,
    num_channels: usize,
    filter_type: FilterType,
    filters: Mutex<Vec<SVFilter>>,
    pub cutoff_hz: FloatParameter,
    pub resonance: FloatParameter,
}

impl FilterEffect {
    pub fn new(num_channels: usize, filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            core: EffectCore::new(),
            num_channels,
            filter_type,
            filters: Mutex::new(Vec::new()),
            cutoff_hz: FloatParameter::new("cutoff", 20.0, 20_000.0, cutoff_hz),
            resonance: FloatParameter::new("resonance", 0.0, MAX_RESONANCE, 0.0),
        }
    }

    pub fn lowpass(num_channels: usize, cutoff_hz: f32) -> Self {
        Self::new(num_channels, FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(num_channels: usize, cutoff_hz: f32) -> Self {
        Self::new(num_channels, FilterType::HighPass, cutoff_hz)
    }

    pub fn with_resonance(self, resonance: f32) -> Self {
        self.resonance.set(resonance);
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}

impl EffectUnit for FilterEffect {
    fn id(&self) -> u64 {
        self.core.id()
    }

    fn initialize(&self, sample_rate: f64, _block_size: usize) {
        let mut filters = self.filters.lock().unwrap_or_else(PoisonError::into_inner);
        *filters = vec![SVFilter::new(self.filter_type); self.num_channels];
        self.core.mark_initialised(sample_rate);
    }

    fn deinitialize(&self) {
        self.filters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.core.mark_deinitialised();
    }

    fn needs_initializing(&self) -> bool {
        self.core.needs_initializing()
    }

    fn apply(&self, context: &mut RenderContext<'_>) {
        let Ok(mut filters) = self.filters.try_lock() else {
            return;
        };

        let sample_rate = self.core.sample_rate() as f32;
        let cutoff = self.cutoff_hz.get();
        let resonance = self.resonance.get();
        let frames = context.frame_range();

        for (filter, channel) in filters.iter_mut().zip(context.dest_buffer.channels_mut()) {
            if context.midi.all_notes_off {
                filter.reset();
            }
            filter.set_cutoff(cutoff);
            filter.set_resonance(resonance);
            filter.render(&mut channel[frames.clone()], sample_rate);
        }
    }

    fn enabled_param(&self) -> &BoolParameter {
        self.core.enabled()
    }

    fn audio_input_count(&self) -> usize {
        self.num_channels
    }
}
