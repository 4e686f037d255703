//! Core types shared across the opendrift crates:
//! - Fixed-timestep time management for the simulation loop
//! - The ground-height query trait connecting vehicle and terrain

pub mod ground;
pub mod time;

pub use ground::*;
pub use time::*;

// Re-export commonly used math types
pub use glam::{Vec2, Vec3};
