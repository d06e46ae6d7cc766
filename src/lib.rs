pub mod buffer; // Planar audio blocks and MIDI event lists
pub mod config;
pub mod dsp;
pub mod effects; // Ready-made effect units
pub mod error;
pub mod graph; // Graph nodes, effect hosting and the block player
pub mod params;
pub mod time;
pub mod transport; // Playhead, mute policy and context providers

pub use config::EngineConfig;
pub use error::ConfigError;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIDI_BUFFER_CAPACITY: usize = 512;
