//! Biome classification and per-biome terrain parameters.

use glam::Vec3;

/// Discrete terrain classification. Affects height scaling; color and tree
/// density are data for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biome {
    Mountain,
    Snow,
    Forest,
    Grass,
    Desert,
}

/// All biome types for iteration.
pub const ALL_BIOMES: [Biome; 5] = [
    Biome::Mountain,
    Biome::Snow,
    Biome::Forest,
    Biome::Grass,
    Biome::Desert,
];

/// Per-biome terrain parameters.
#[derive(Debug, Clone)]
pub struct BiomeConfig {
    pub biome: Biome,
    /// Multiplier applied to the fractal height.
    pub height_scale: f32,
    /// Base ground color for terrain tinting.
    pub base_color: Vec3,
    /// Vegetation density hint for the presentation layer.
    pub tree_density: f32,
}

impl BiomeConfig {
    /// Get the configuration for a biome type.
    pub fn from_type(biome: Biome) -> Self {
        match biome {
            // Exposed granite ridges, little vegetation
            Biome::Mountain => Self {
                biome,
                height_scale: 2.5,
                base_color: Vec3::new(0.40, 0.38, 0.35),
                tree_density: 0.05,
            },
            // High-altitude snowfields
            Biome::Snow => Self {
                biome,
                height_scale: 1.6,
                base_color: Vec3::new(0.85, 0.88, 0.92),
                tree_density: 0.10,
            },
            // Rolling wooded hills
            Biome::Forest => Self {
                biome,
                height_scale: 1.2,
                base_color: Vec3::new(0.13, 0.35, 0.12),
                tree_density: 0.90,
            },
            // Open drivable plains
            Biome::Grass => Self {
                biome,
                height_scale: 0.8,
                base_color: Vec3::new(0.30, 0.55, 0.20),
                tree_density: 0.30,
            },
            // Flat arid basins
            Biome::Desert => Self {
                biome,
                height_scale: 0.5,
                base_color: Vec3::new(0.82, 0.68, 0.48),
                tree_density: 0.02,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_biome_has_positive_height_scale() {
        for biome in ALL_BIOMES {
            let config = BiomeConfig::from_type(biome);
            assert!(config.height_scale > 0.0);
            assert_eq!(config.biome, biome);
        }
    }
}
