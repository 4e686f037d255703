//! Deterministic elevation and biome sampling over world coordinates.

use crate::biome::{Biome, BiomeConfig};
use crate::config::WorldConfig;
use crate::noise::{derive_seed, ValueNoise};

/// Pure height/biome sampler. Total over the whole coordinate domain; no
/// failure states. Same `(x, z)` and config always yield bit-identical
/// results.
#[derive(Debug, Clone)]
pub struct HeightField {
    height_noise: ValueNoise,
    variation_noise: ValueNoise,
    height_scale: f32,
    base_height: f32,
    base_frequency: f64,
    biome_frequency: f64,
}

impl HeightField {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            height_noise: ValueNoise::new(derive_seed(config.seed, 0)),
            variation_noise: ValueNoise::new(derive_seed(config.seed, 1)),
            height_scale: config.height_scale,
            base_height: config.base_height,
            base_frequency: config.base_frequency,
            biome_frequency: config.biome_frequency,
        }
    }

    /// Elevation at a world coordinate: three octaves of value noise at
    /// doubling frequency and halving amplitude, scaled by the biome's
    /// height multiplier.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let (xs, zs) = (x as f64, z as f64);
        let f = self.base_frequency;
        let fractal = self.height_noise.sample(xs * f, zs * f)
            + self.height_noise.sample(xs * f * 2.0, zs * f * 2.0) * 0.5
            + self.height_noise.sample(xs * f * 4.0, zs * f * 4.0) * 0.25;

        let biome = BiomeConfig::from_type(self.biome_at(x, z));
        fractal as f32 * self.height_scale * biome.height_scale + self.base_height
    }

    /// Biome at a world coordinate. The height sample picks the band; the
    /// lower-frequency variation sample (independent seed) breaks the
    /// Snow/Forest and Forest/Grass ties.
    pub fn biome_at(&self, x: f32, z: f32) -> Biome {
        let (xs, zs) = (x as f64, z as f64);
        let height = self
            .height_noise
            .sample(xs * self.base_frequency, zs * self.base_frequency);
        let variation = self
            .variation_noise
            .sample(xs * self.biome_frequency, zs * self.biome_frequency);

        if height > 0.7 {
            Biome::Mountain
        } else if height > 0.6 {
            if variation > 0.6 {
                Biome::Snow
            } else {
                Biome::Forest
            }
        } else if height > 0.4 {
            if variation > 0.5 {
                Biome::Forest
            } else {
                Biome::Grass
            }
        } else if height > 0.2 {
            Biome::Grass
        } else {
            Biome::Desert
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> HeightField {
        HeightField::new(&WorldConfig {
            seed: 424242,
            ..Default::default()
        })
    }

    /// Same arguments must return bit-identical heights across calls.
    #[test]
    fn height_deterministic() {
        let field = field();
        for i in 0..200 {
            let x = i as f32 * 3.7 - 250.0;
            let z = i as f32 * -2.3 + 120.0;
            assert_eq!(
                field.height_at(x, z).to_bits(),
                field.height_at(x, z).to_bits()
            );
        }
    }

    #[test]
    fn biome_deterministic() {
        let field = field();
        for i in 0..200 {
            let x = i as f32 * 11.0 - 900.0;
            let z = i as f32 * 7.0;
            assert_eq!(field.biome_at(x, z), field.biome_at(x, z));
        }
    }

    /// Two fields built from the same config agree everywhere.
    #[test]
    fn same_seed_same_terrain() {
        let config = WorldConfig {
            seed: 8080,
            ..Default::default()
        };
        let a = HeightField::new(&config);
        let b = HeightField::new(&config);
        for i in -40..40 {
            let (x, z) = (i as f32 * 13.1, i as f32 * -5.9);
            assert_eq!(a.height_at(x, z).to_bits(), b.height_at(x, z).to_bits());
        }
    }

    #[test]
    fn different_seed_different_terrain() {
        let a = HeightField::new(&WorldConfig {
            seed: 1,
            ..Default::default()
        });
        let b = HeightField::new(&WorldConfig {
            seed: 2,
            ..Default::default()
        });
        let differing = (0..100)
            .filter(|&i| {
                let (x, z) = (i as f32 * 9.3, i as f32 * 4.7);
                a.height_at(x, z) != b.height_at(x, z)
            })
            .count();
        assert!(differing > 90);
    }
}
