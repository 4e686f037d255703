//! World generation configuration.
//!
//! Seeds and scale constants are explicit and injected at construction rather
//! than living in process-wide globals, so multiple worlds (and tests) can
//! run independently without interference.

use serde::{Deserialize, Serialize};

/// Configuration for a terrain world.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed. Noise sub-seeds are derived deterministically from it.
    pub seed: u64,
    /// Side length of one chunk in world units.
    pub chunk_size: f32,
    /// Sample cells per chunk side (grid is `resolution + 1` samples wide).
    pub chunk_resolution: u32,
    /// Radius, in chunks, kept generated around the reference point.
    pub view_radius: i32,
    /// Base height amplitude in world units.
    pub height_scale: f32,
    /// Uniform lift applied to all terrain.
    pub base_height: f32,
    /// Frequency of the first height octave (lower = smoother).
    pub base_frequency: f64,
    /// Frequency of the biome variation noise.
    pub biome_frequency: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            chunk_size: 50.0,
            chunk_resolution: 25,
            view_radius: 2,
            height_scale: 20.0,
            base_height: 0.0,
            base_frequency: 0.02,
            biome_frequency: 0.005,
        }
    }
}
