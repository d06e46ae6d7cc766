//! Lock-free parameters shared between the control thread and the audio thread.
//!
//! Values live in atomics so the audio callback can read them without taking a
//! lock. Writers (UI, automation) simply store a new value; readers see it on
//! the next block.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// On/off parameter, e.g. an effect's enable switch.
#[derive(Debug)]
pub struct BoolParameter {
    name: &'static str,
    value: AtomicBool,
}

impl BoolParameter {
    pub fn new(name: &'static str, default: bool) -> Self {
        Self {
            name,
            value: AtomicBool::new(default),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }

    /// Flip the value and return the new state
    pub fn toggle(&self) -> bool {
        !self.value.fetch_xor(true, Ordering::AcqRel)
    }
}

/// Continuous parameter clamped to `[min, max]`, stored as `f32` bits.
#[derive(Debug)]
pub struct FloatParameter {
    name: &'static str,
    min: f32,
    max: f32,
    bits: AtomicU32,
}

impl FloatParameter {
    pub fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        debug_assert!(min <= max);
        Self {
            name,
            min,
            max,
            bits: AtomicU32::new(default.clamp(min, max).to_bits()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, value: f32) {
        self.bits
            .store(value.clamp(self.min, self.max).to_bits(), Ordering::Release);
    }
}
