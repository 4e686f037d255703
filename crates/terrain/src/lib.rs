//! Procedural terrain: deterministic height field, biome classification,
//! and chunk-based lazy generation around a moving reference point.

pub mod biome;
pub mod chunk;
pub mod config;
pub mod heightfield;
pub mod noise;

pub use biome::*;
pub use chunk::*;
pub use config::*;
pub use heightfield::*;
pub use noise::*;
