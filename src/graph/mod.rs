//! Block-processing graph: nodes, effect hosting and a simple player.
//!
//! Nodes own their inputs and produce one block of audio plus MIDI per call
//! to `process`. The [`effect_node::EffectNode`] wraps an input with a shared
//! [`effect::EffectUnit`] and takes care of everything between the graph and
//! the unit: channel widening, mute and transport policy, note hygiene and
//! the render context.

/// Effect unit trait and per-block render context.
pub mod effect;
/// Node that hosts an effect unit.
pub mod effect_node;
/// Core trait shared by all graph nodes.
pub mod node;
/// Depth-first block scheduler.
pub mod player;
/// Audio/MIDI sources.
pub mod source;

pub use effect::{EffectUnit, RenderContext, SharedEffect, TransportInfo};
pub use effect_node::{EffectNode, TimelineTiming, TimingMode};
pub use node::{Node, NodeBuffers, NodeProperties, PrepareInfo};
pub use player::GraphPlayer;
pub use source::{BufferSource, ToneSource};
