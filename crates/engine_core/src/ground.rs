//! Ground-height query interface.
//!
//! The vehicle simulation owns no terrain data; it samples the ground through
//! this trait for wheel contact, slope, and the pitch/roll probes. Heights
//! must be deterministic and defined for arbitrary real-valued coordinates,
//! not just grid points — the car samples at sub-meter offsets.

/// Source of terrain elevation over the (x, z) ground plane.
pub trait HeightSource {
    /// Elevation (world Y) at the given world coordinate.
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Perfectly flat ground at a fixed elevation. Useful for tests and as a
/// stand-in before a terrain world is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround {
    pub elevation: f32,
}

impl HeightSource for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.elevation
    }
}
