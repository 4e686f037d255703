//! Arcade-style vehicle dynamics: engine, transmission, tires, steering,
//! braking, and drift, advanced once per fixed timestep against a terrain
//! height source.

pub mod car;
pub mod gearbox;
pub mod tuning;

pub use car::*;
pub use gearbox::*;
pub use tuning::*;
