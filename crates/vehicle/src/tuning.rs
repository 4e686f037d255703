//! Vehicle tuning profile.
//!
//! Every physics coefficient lives in one immutable struct so profiles can be
//! swapped per vehicle and validated independently of the integration logic.
//! The defaults describe the reference sedan: ~1.4 t, 120 kW, six gears.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tuning table failed validation.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("gear ratio table is empty")]
    EmptyGearTable,
    #[error("per-gear table `{table}` has {found} entries, expected {expected}")]
    MismatchedGearTable {
        table: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("max_rpm ({max_rpm}) must exceed idle_rpm ({idle_rpm})")]
    RpmRange { idle_rpm: f32, max_rpm: f32 },
}

/// Immutable physics coefficients for one vehicle profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    // Body
    /// Vehicle mass in kg.
    pub mass: f32,
    /// Distance between axles in meters.
    pub wheelbase: f32,
    /// Rolling radius of the tires in meters.
    pub wheel_radius: f32,
    /// Ground clearance added to the terrain height under the car.
    pub ride_height: f32,

    // Engine
    /// Peak engine power in watts.
    pub engine_power: f32,
    pub idle_rpm: f32,
    pub max_rpm: f32,
    /// Upshifts are only accepted above this RPM.
    pub optimal_shift_rpm: f32,
    /// Downshifts that would rev past this are rejected.
    pub redline_rpm: f32,
    /// Below this RPM a gear above first produces no force at low speed.
    pub stall_rpm: f32,
    /// Exponential throttle-body lag, fraction applied per tick.
    pub throttle_smoothing: f32,
    /// Spool-up rate of the power-buildup fraction.
    pub power_buildup_rate: f32,
    /// Decay rate of the power-buildup fraction when the throttle is released.
    pub power_decay_rate: f32,

    // Launch (first-gear low-speed regime)
    /// Speed (km/h) below which the dedicated first-gear launch model applies.
    pub initial_power_band_kmh: f32,
    /// Base power fraction available during launch.
    pub launch_power: f32,
    /// How quickly the clutch engages with speed during launch.
    pub clutch_engagement_speed: f32,

    // Transmission
    pub gear_ratios: Vec<f32>,
    /// Speed ceiling per gear in km/h; the soft limiter starts at 85% of it.
    pub gear_speed_limits_kmh: Vec<f32>,
    /// Minimum viable start speed per gear in km/h (gears 1-2 exempt).
    pub min_start_speeds_kmh: Vec<f32>,
    pub differential_ratio: f32,
    pub transmission_efficiency: f32,
    /// Time the engine stays decoupled during a gear change, seconds.
    pub shift_duration: f32,

    // Longitudinal
    /// Quadratic aerodynamic drag coefficient.
    pub drag_coefficient: f32,
    /// Linear rolling resistance coefficient.
    pub rolling_resistance: f32,
    /// Global damping on engine acceleration, tuned for feel.
    pub acceleration_factor: f32,
    /// Forward speed cap in m/s; reverse is capped at half of it.
    pub max_speed: f32,

    // Braking
    pub max_brake_force: f32,
    /// Power-law exponent of the pedal response.
    pub brake_response: f32,
    pub brake_efficiency: f32,
    /// Below this speed (km/h) braking switches to the low-speed stop model.
    pub brake_low_speed_kmh: f32,
    /// Below this speed (m/s) the parking-brake snap takes over.
    pub brake_stop_threshold: f32,
    /// Per-tick velocity multiplier of the parking-brake snap.
    pub parking_brake_factor: f32,
    /// Deceleration (m/s^2) of the fixed low-speed braking band.
    pub brake_low_speed_decel: f32,

    // Steering
    /// Maximum steering angle at standstill, radians.
    pub max_steering_angle: f32,
    /// Approach rate toward the steering target.
    pub steer_speed: f32,
    /// Return-to-center rate when the input is inside the deadzone.
    pub steer_return_speed: f32,
    /// Per-tick angular velocity multiplier while coasting straight.
    pub angular_damping: f32,

    // Cornering
    pub grip_factor: f32,
    pub turn_speed_factor: f32,
    /// Responsiveness of angular velocity toward the target turn rate.
    pub turn_response: f32,
    /// Speed (m/s) at which cornering grip bottoms out.
    pub drift_threshold: f32,

    // Handbrake drift
    /// Speed (km/h) the car must exceed for the handbrake to start a drift.
    pub drift_speed_threshold_kmh: f32,
    /// How strongly steering accumulates into the drift angle.
    pub drift_angle_factor: f32,
    /// Remaining grip fraction while the handbrake is pulled.
    pub handbrake_grip_factor: f32,
    /// Per-tick multiplicative decay of drift angle and lateral velocity.
    pub drift_recovery_rate: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            mass: 1400.0,
            wheelbase: 2.8,
            wheel_radius: 0.3,
            ride_height: 1.0,

            engine_power: 120_000.0,
            idle_rpm: 800.0,
            max_rpm: 6500.0,
            optimal_shift_rpm: 4000.0,
            redline_rpm: 6800.0,
            stall_rpm: 800.0,
            throttle_smoothing: 0.15,
            power_buildup_rate: 0.4,
            power_decay_rate: 1.0,

            initial_power_band_kmh: 8.0,
            launch_power: 0.4,
            clutch_engagement_speed: 0.4,

            gear_ratios: vec![6.0, 3.8, 2.8, 2.0, 1.5, 1.0],
            gear_speed_limits_kmh: vec![25.0, 50.0, 80.0, 125.0, 160.0, 200.0],
            min_start_speeds_kmh: vec![0.0, 5.0, 15.0, 25.0, 35.0, 45.0],
            differential_ratio: 3.9,
            transmission_efficiency: 0.9,
            shift_duration: 0.3,

            drag_coefficient: 0.4,
            rolling_resistance: 0.1,
            acceleration_factor: 0.4,
            max_speed: 60.0,

            max_brake_force: 25_000.0,
            brake_response: 0.7,
            brake_efficiency: 1.2,
            brake_low_speed_kmh: 8.0,
            brake_stop_threshold: 0.8,
            parking_brake_factor: 0.92,
            brake_low_speed_decel: 8.0,

            max_steering_angle: std::f32::consts::PI / 6.5,
            steer_speed: 2.5,
            steer_return_speed: 6.0,
            angular_damping: 0.85,

            grip_factor: 1.2,
            turn_speed_factor: 0.65,
            turn_response: 3.0,
            drift_threshold: 25.0,

            drift_speed_threshold_kmh: 12.0,
            drift_angle_factor: 2.5,
            handbrake_grip_factor: 0.15,
            drift_recovery_rate: 0.95,
        }
    }
}

impl VehicleTuning {
    /// Number of forward gears.
    pub fn gear_count(&self) -> usize {
        self.gear_ratios.len()
    }

    /// Ratio of a 1-based gear index.
    pub fn ratio(&self, gear: usize) -> f32 {
        self.gear_ratios[gear - 1]
    }

    /// Speed ceiling of a 1-based gear index, km/h.
    pub fn speed_limit_kmh(&self, gear: usize) -> f32 {
        self.gear_speed_limits_kmh[gear - 1]
    }

    /// Minimum viable start speed of a 1-based gear index, km/h.
    pub fn min_start_kmh(&self, gear: usize) -> f32 {
        self.min_start_speeds_kmh[gear - 1]
    }

    /// Check the profile for internal consistency.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.gear_ratios.is_empty() {
            return Err(TuningError::EmptyGearTable);
        }
        let gears = self.gear_ratios.len();
        for (table, len) in [
            ("gear_speed_limits_kmh", self.gear_speed_limits_kmh.len()),
            ("min_start_speeds_kmh", self.min_start_speeds_kmh.len()),
        ] {
            if len != gears {
                return Err(TuningError::MismatchedGearTable {
                    table,
                    expected: gears,
                    found: len,
                });
            }
        }
        for (field, value) in [
            ("mass", self.mass),
            ("wheelbase", self.wheelbase),
            ("wheel_radius", self.wheel_radius),
            ("max_speed", self.max_speed),
            ("shift_duration", self.shift_duration),
        ] {
            if value <= 0.0 {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        if self.max_rpm <= self.idle_rpm {
            return Err(TuningError::RpmRange {
                idle_rpm: self.idle_rpm,
                max_rpm: self.max_rpm,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        assert_eq!(VehicleTuning::default().validate(), Ok(()));
    }

    #[test]
    fn empty_gear_table_rejected() {
        let tuning = VehicleTuning {
            gear_ratios: vec![],
            ..Default::default()
        };
        assert_eq!(tuning.validate(), Err(TuningError::EmptyGearTable));
    }

    #[test]
    fn mismatched_gear_table_rejected() {
        let tuning = VehicleTuning {
            min_start_speeds_kmh: vec![0.0, 5.0],
            ..Default::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(TuningError::MismatchedGearTable {
                table: "min_start_speeds_kmh",
                expected: 6,
                found: 2,
            })
        );
    }

    #[test]
    fn non_positive_mass_rejected() {
        let tuning = VehicleTuning {
            mass: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NonPositive { field: "mass", .. })
        ));
    }

    #[test]
    fn inverted_rpm_range_rejected() {
        let tuning = VehicleTuning {
            max_rpm: 500.0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::RpmRange { .. })));
    }
}
