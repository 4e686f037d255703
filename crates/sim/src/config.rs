//! Driver configuration (session, world, vehicle). Loaded from sim.ron at startup.

use serde::{Deserialize, Serialize};
use terrain::WorldConfig;
use vehicle::VehicleTuning;

/// Persistent driver settings. Loaded from `sim.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Pinned world seed. When absent a fresh session seed is drawn at startup.
    pub seed: Option<u64>,
    /// Length of the scripted session in simulated seconds.
    pub duration_seconds: f32,
    /// Car spawn point on the ground plane.
    pub spawn_x: f32,
    pub spawn_z: f32,
    /// Seconds of simulated time between HUD log lines.
    pub hud_interval_seconds: f32,
    /// Cooldown applied after an accepted gear shift.
    pub shift_cooldown_seconds: f32,
    pub world: WorldConfig,
    pub vehicle: VehicleTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 40.0,
            spawn_x: 0.0,
            spawn_z: 0.0,
            hud_interval_seconds: 1.0,
            shift_cooldown_seconds: 0.3,
            world: WorldConfig::default(),
            vehicle: VehicleTuning::default(),
        }
    }
}

impl SimConfig {
    /// Load config from `sim.ron`. If the file is missing or invalid, returns
    /// default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("sim.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_fills_remaining_fields_from_defaults() {
        let config: SimConfig =
            ron::from_str("(duration_seconds: 5.0, seed: Some(7))").unwrap();
        assert_eq!(config.duration_seconds, 5.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.shift_cooldown_seconds, 0.3);
        assert_eq!(config.world.chunk_size, WorldConfig::default().chunk_size);
    }

    #[test]
    fn default_config_round_trips_through_ron() {
        let config = SimConfig::default();
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let back: SimConfig = ron::from_str(&text).unwrap();
        assert_eq!(back.duration_seconds, config.duration_seconds);
        assert_eq!(back.world.seed, config.world.seed);
        assert_eq!(back.vehicle.gear_ratios, config.vehicle.gear_ratios);
    }
}
