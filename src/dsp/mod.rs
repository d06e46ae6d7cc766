//! Low-level DSP primitives used by the ready-made effect units.
//!
//! These components allocate only when constructed and are realtime-safe
//! afterwards, making them safe to keep inside an effect's per-channel state.
//! They intentionally stay focused on the signal-processing math so effect
//! units can layer on parameters and channel handling.

/// Time-domain delay line with optional interpolation.
pub mod delay;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Oscillator waveforms.
pub mod oscillator;
