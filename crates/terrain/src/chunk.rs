//! Chunk-based lazy terrain materialization.
//!
//! Chunks are the unit of generation and caching: a fixed-size square region
//! sampled into a regular grid, keyed by the floor-divided world coordinate.
//! Once generated a chunk is never mutated, and the cache never shrinks for
//! the lifetime of the session.

use std::collections::HashMap;

use engine_core::HeightSource;

use crate::biome::Biome;
use crate::config::WorldConfig;
use crate::heightfield::HeightField;

/// Chunk coordinate owning a world position (floor division, so negative
/// world coordinates map to negative chunk indices without a seam at zero).
#[inline]
pub fn chunk_coord(world: f32, chunk_size: f32) -> i32 {
    (world / chunk_size).floor() as i32
}

/// One grid sample of a generated chunk.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSample {
    pub height: f32,
    pub biome: Biome,
}

/// An immutable height/biome sample grid for one terrain chunk.
///
/// The grid has `(resolution + 1)^2` samples so neighboring chunks share
/// their edge rows; heights are sampled from the continuous height field at
/// the exact world coordinate of each grid point and therefore agree across
/// chunk boundaries.
#[derive(Debug)]
pub struct TerrainChunk {
    /// Chunk coordinate (world origin = coordinate * chunk size).
    pub coord: (i32, i32),
    pub resolution: u32,
    /// Row-major over z, then x; `(resolution + 1)^2` entries.
    pub samples: Vec<ChunkSample>,
}

impl TerrainChunk {
    /// Generate the chunk at the given coordinate.
    pub fn generate(
        coord: (i32, i32),
        field: &HeightField,
        chunk_size: f32,
        resolution: u32,
    ) -> Self {
        let side = resolution as usize + 1;
        let step = chunk_size / resolution as f32;
        let origin_x = coord.0 as f32 * chunk_size;
        let origin_z = coord.1 as f32 * chunk_size;

        let mut samples = Vec::with_capacity(side * side);
        for iz in 0..side {
            for ix in 0..side {
                let world_x = origin_x + ix as f32 * step;
                let world_z = origin_z + iz as f32 * step;
                samples.push(ChunkSample {
                    height: field.height_at(world_x, world_z),
                    biome: field.biome_at(world_x, world_z),
                });
            }
        }

        Self {
            coord,
            resolution,
            samples,
        }
    }

    /// World-space origin (minimum corner) of this chunk.
    pub fn origin(&self, chunk_size: f32) -> (f32, f32) {
        (
            self.coord.0 as f32 * chunk_size,
            self.coord.1 as f32 * chunk_size,
        )
    }

    /// Grid sample at `(ix, iz)`, both in `0..=resolution`.
    pub fn sample(&self, ix: u32, iz: u32) -> &ChunkSample {
        let side = self.resolution as usize + 1;
        &self.samples[iz as usize * side + ix as usize]
    }
}

/// Lazily materializes terrain chunks around a moving reference point.
///
/// Chunks persist once generated. Exact-coordinate height queries go straight
/// to the continuous [`HeightField`] rather than through the coarse chunk
/// grid, so sub-meter slope probes see no quantization from the grid.
#[derive(Debug)]
pub struct ChunkManager {
    config: WorldConfig,
    field: HeightField,
    chunks: HashMap<(i32, i32), TerrainChunk>,
}

impl ChunkManager {
    pub fn new(config: WorldConfig) -> Self {
        let field = HeightField::new(&config);
        Self {
            config,
            field,
            chunks: HashMap::new(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The continuous height field backing this world.
    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    /// Chunk coordinate owning a world position.
    pub fn chunk_coord_at(&self, x: f32, z: f32) -> (i32, i32) {
        (
            chunk_coord(x, self.config.chunk_size),
            chunk_coord(z, self.config.chunk_size),
        )
    }

    fn ensure_chunk(&mut self, coord: (i32, i32)) {
        if !self.chunks.contains_key(&coord) {
            let chunk = TerrainChunk::generate(
                coord,
                &self.field,
                self.config.chunk_size,
                self.config.chunk_resolution,
            );
            log::debug!(
                "generated chunk ({}, {}) with {} samples",
                coord.0,
                coord.1,
                chunk.samples.len()
            );
            self.chunks.insert(coord, chunk);
        }
    }

    /// Ground height at an exact world coordinate, materializing the owning
    /// chunk if it is not cached yet.
    pub fn get_height(&mut self, x: f32, z: f32) -> f32 {
        let coord = self.chunk_coord_at(x, z);
        self.ensure_chunk(coord);
        self.field.height_at(x, z)
    }

    /// Biome at a world coordinate.
    pub fn biome_at(&self, x: f32, z: f32) -> Biome {
        self.field.biome_at(x, z)
    }

    /// Eagerly generate every chunk within a square radius (in chunk units)
    /// of the reference point, so neighbors are ready before the car crosses
    /// into them. Called at world creation and every tick thereafter.
    pub fn ensure_chunks_near(&mut self, x: f32, z: f32, radius: i32) {
        let (cx, cz) = self.chunk_coord_at(x, z);
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                self.ensure_chunk((cx + dx, cz + dz));
            }
        }
    }

    /// Number of chunks currently materialized.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Materialized chunk at a chunk coordinate, if any.
    pub fn chunk(&self, coord: (i32, i32)) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    /// All materialized chunks (for mesh building by the presentation layer).
    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.values()
    }
}

impl HeightSource for ChunkManager {
    /// Exact-coordinate sample of the continuous field. Deterministic and
    /// total; does not require the owning chunk to be materialized.
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.field.height_at(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(seed: u64) -> ChunkManager {
        ChunkManager::new(WorldConfig {
            seed,
            ..Default::default()
        })
    }

    /// Floor division must assign negative world coordinates to negative
    /// chunk indices with no double-width chunk at the origin.
    #[test]
    fn chunk_coords_floor_divide() {
        assert_eq!(chunk_coord(0.0, 50.0), 0);
        assert_eq!(chunk_coord(49.9, 50.0), 0);
        assert_eq!(chunk_coord(50.0, 50.0), 1);
        assert_eq!(chunk_coord(-0.1, 50.0), -1);
        assert_eq!(chunk_coord(-50.0, 50.0), -1);
        assert_eq!(chunk_coord(-50.1, 50.0), -2);
    }

    /// Materializing chunks must not perturb the continuous height function.
    #[test]
    fn height_unchanged_by_ensure_chunks_near() {
        let mut world = manager(555);
        let (x, z) = (137.2, -83.6);
        let before = world.get_height(x, z);
        world.ensure_chunks_near(x, z, 3);
        let after = world.get_height(x, z);
        assert_eq!(before.to_bits(), after.to_bits());
    }

    /// Regenerating the same chunk coordinate yields bit-identical samples.
    #[test]
    fn chunk_regeneration_is_bit_identical() {
        let config = WorldConfig {
            seed: 31337,
            ..Default::default()
        };
        let field = HeightField::new(&config);
        let a = TerrainChunk::generate((-3, 7), &field, config.chunk_size, config.chunk_resolution);
        let b = TerrainChunk::generate((-3, 7), &field, config.chunk_size, config.chunk_resolution);
        assert_eq!(a.samples.len(), b.samples.len());
        for (sa, sb) in a.samples.iter().zip(b.samples.iter()) {
            assert_eq!(sa.height.to_bits(), sb.height.to_bits());
            assert_eq!(sa.biome, sb.biome);
        }
    }

    #[test]
    fn ensure_chunks_near_covers_square_radius() {
        let mut world = manager(1);
        world.ensure_chunks_near(0.0, 0.0, 2);
        assert_eq!(world.chunk_count(), 25);
        // Re-ensuring the same area generates nothing new.
        world.ensure_chunks_near(10.0, 10.0, 2);
        assert_eq!(world.chunk_count(), 25);
    }

    /// Chunk grid samples must match the continuous field at the same world
    /// coordinate (shared edges between neighbors follow from this).
    #[test]
    fn chunk_samples_match_field() {
        let config = WorldConfig {
            seed: 9,
            ..Default::default()
        };
        let field = HeightField::new(&config);
        let chunk = TerrainChunk::generate((2, -1), &field, config.chunk_size, config.chunk_resolution);
        let (ox, oz) = chunk.origin(config.chunk_size);
        let step = config.chunk_size / config.chunk_resolution as f32;
        for iz in [0, 5, config.chunk_resolution] {
            for ix in [0, 13, config.chunk_resolution] {
                let expected = field.height_at(ox + ix as f32 * step, oz + iz as f32 * step);
                assert_eq!(chunk.sample(ix, iz).height.to_bits(), expected.to_bits());
            }
        }
    }

    #[test]
    fn get_height_materializes_owning_chunk() {
        let mut world = manager(77);
        assert_eq!(world.chunk_count(), 0);
        world.get_height(-120.0, 260.0);
        assert_eq!(world.chunk_count(), 1);
        assert!(world.chunk((-3, 5)).is_some());
    }
}
