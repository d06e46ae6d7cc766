//! Ready-made effect units.
//!
//! Each unit pairs an [`EffectCore`] (id, enable switch, lifecycle flag) with
//! its own lock-free parameters. Units with DSP state keep it behind a
//! `Mutex` that the audio thread only ever `try_lock`s: while the control
//! thread (re)initialises the state, blocks pass through unprocessed instead
//! of waiting.

/// Feedback delay over every channel.
pub mod delay;
/// State-variable filter over every channel.
pub mod filter;
/// Linear gain.
pub mod gain;
/// MIDI note transposition.
pub mod transpose;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::params::BoolParameter;

pub use delay::DelayEffect;
pub use filter::FilterEffect;
pub use gain::GainEffect;
pub use transpose::TransposeEffect;

static NEXT_EFFECT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-wide unique, non-zero effect id
pub fn next_effect_id() -> u64 {
    let id = NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed);
    if id == 0 {
        NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed)
    } else {
        id
    }
}

/// State every effect unit carries.
#[derive(Debug)]
pub struct EffectCore {
    id: u64,
    enabled: BoolParameter,
    initialised: AtomicBool,
    sample_rate_bits: AtomicU64,
}

impl Default for EffectCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectCore {
    pub fn new() -> Self {
        Self {
            id: next_effect_id(),
            enabled: BoolParameter::new("enabled", true),
            initialised: AtomicBool::new(false),
            sample_rate_bits: AtomicU64::new(0.0f64.to_bits()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn enabled(&self) -> &BoolParameter {
        &self.enabled
    }

    pub fn mark_initialised(&self, sample_rate: f64) {
        self.sample_rate_bits
            .store(sample_rate.to_bits(), Ordering::Release);
        self.initialised.store(true, Ordering::Release);
    }

    pub fn mark_deinitialised(&self) {
        self.initialised.store(false, Ordering::Release);
    }

    pub fn needs_initializing(&self) -> bool {
        !self.initialised.load(Ordering::Acquire)
    }

    /// Rate of the last initialisation (0 before the first)
    pub fn sample_rate(&self) -> f64 {
        f64::from_bits(self.sample_rate_bits.load(Ordering::Acquire))
    }
}
