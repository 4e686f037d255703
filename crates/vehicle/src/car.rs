//! Per-tick vehicle simulation.
//!
//! The car lives on the (x, z) ground plane with Y up. Heading 0 points down
//! +X and grows toward +Z; forward is `(cos h, sin h)` and the sideways axis
//! is `(-sin h, cos h)`. Velocity is a signed scalar along the forward axis,
//! positive when driving forward.

use engine_core::HeightSource;
use glam::Vec3;

use crate::gearbox::Gearbox;
use crate::tuning::VehicleTuning;

const MS_TO_KMH: f32 = 3.6;
/// Steering inputs inside this band snap the wheel back to center.
const STEER_DEADZONE: f32 = 0.1;
/// Maximum RPM slew rate, RPM per second.
const RPM_TRACK_RATE: f32 = 3000.0;
/// The soft limiter ramps in from this fraction of the gear's speed ceiling.
const GEAR_LIMITER_START: f32 = 0.85;
/// Distance of the pitch/roll terrain probes, meters.
const ORIENTATION_PROBE: f32 = 2.0;

/// Read-only view of the car state for rendering and HUD.
#[derive(Debug, Clone, Copy)]
pub struct CarSnapshot {
    pub position: Vec3,
    pub heading: f32,
    pub pitch: f32,
    pub roll: f32,
    /// 1-based gear index.
    pub gear: usize,
    pub rpm: f32,
    /// Signed forward velocity, m/s.
    pub velocity: f32,
}

impl CarSnapshot {
    /// Absolute speed in km/h, as shown on the HUD.
    pub fn speed_kmh(&self) -> f32 {
        self.velocity.abs() * MS_TO_KMH
    }
}

/// The simulated car. Created once at simulation start; mutated exclusively
/// by [`Car::step`] and the input setters.
#[derive(Debug, Clone)]
pub struct Car {
    position: Vec3,
    heading: f32,
    /// Signed forward velocity, m/s.
    velocity: f32,
    angular_velocity: f32,
    steering_angle: f32,
    /// Derived from terrain probes, presentation only.
    pitch: f32,
    roll: f32,

    // Inputs, clamped at the boundary. The drift phase attenuates the stored
    // throttle while sliding, so it is re-applied by the input layer each tick.
    throttle: f32,
    brake: f32,
    steering_input: f32,
    handbrake: f32,

    // Engine state
    current_throttle: f32,
    power_buildup: f32,
    clutch_slip: f32,
    rpm: f32,

    // Drift state, all decaying toward zero absent handbrake input
    drift_angle: f32,
    drift_momentum: f32,
    lateral_velocity: f32,

    gearbox: Gearbox,
    tuning: VehicleTuning,
}

impl Car {
    /// Create a car at rest in first gear with all inputs zero. The Y
    /// component of `position` is overwritten by terrain following on the
    /// first step.
    pub fn new(position: Vec3, tuning: VehicleTuning) -> Self {
        Self {
            position,
            heading: 0.0,
            velocity: 0.0,
            angular_velocity: 0.0,
            steering_angle: 0.0,
            pitch: 0.0,
            roll: 0.0,
            throttle: 0.0,
            brake: 0.0,
            steering_input: 0.0,
            handbrake: 0.0,
            current_throttle: 0.0,
            power_buildup: 0.0,
            clutch_slip: 1.0,
            rpm: tuning.idle_rpm,
            drift_angle: 0.0,
            drift_momentum: 0.0,
            lateral_velocity: 0.0,
            gearbox: Gearbox::new(),
            tuning,
        }
    }

    // ── Input boundary: every setter saturates to its valid range ─────────

    pub fn apply_throttle(&mut self, amount: f32) {
        self.throttle = amount.clamp(0.0, 1.0);
    }

    pub fn apply_brake(&mut self, amount: f32) {
        self.brake = amount.clamp(0.0, 1.0);
    }

    pub fn apply_steering(&mut self, amount: f32) {
        self.steering_input = amount.clamp(-1.0, 1.0);
    }

    pub fn apply_handbrake(&mut self, amount: f32) {
        self.handbrake = amount.clamp(0.0, 1.0);
    }

    /// Request an upshift; see [`Gearbox::shift_up`]. Returns acceptance so
    /// the input layer can apply a cooldown only on successful shifts.
    pub fn shift_up(&mut self) -> bool {
        self.gearbox.shift_up(self.rpm, &self.tuning)
    }

    /// Request a downshift; see [`Gearbox::shift_down`].
    pub fn shift_down(&mut self) -> bool {
        self.gearbox.shift_down(self.rpm, &self.tuning)
    }

    // ── Read access ────────────────────────────────────────────────────────

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn steering_angle(&self) -> f32 {
        self.steering_angle
    }

    /// Current gear, 1-based.
    pub fn gear(&self) -> usize {
        self.gearbox.gear()
    }

    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    pub fn is_shifting(&self) -> bool {
        self.gearbox.is_shifting()
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn brake(&self) -> f32 {
        self.brake
    }

    pub fn steering_input(&self) -> f32 {
        self.steering_input
    }

    pub fn handbrake(&self) -> f32 {
        self.handbrake
    }

    pub fn tuning(&self) -> &VehicleTuning {
        &self.tuning
    }

    /// Snapshot for rendering and HUD.
    pub fn snapshot(&self) -> CarSnapshot {
        CarSnapshot {
            position: self.position,
            heading: self.heading,
            pitch: self.pitch,
            roll: self.roll,
            gear: self.gearbox.gear(),
            rpm: self.rpm,
            velocity: self.velocity,
        }
    }

    // ── Simulation ─────────────────────────────────────────────────────────

    /// Advance the car by one fixed timestep against the given ground.
    ///
    /// Phases run in a fixed order; each consumes the previous phase's
    /// output. All numeric edge cases (near-zero speed, near-zero steering,
    /// zero-length displacement) branch to a zero-effect default instead of
    /// dividing by zero.
    pub fn step(&mut self, dt: f32, ground: &impl HeightSource) {
        self.update_steering(dt);
        self.gearbox.tick(dt);
        self.update_drift(dt);
        self.integrate_lateral(dt);
        let engine_force = self.engine_force(dt);
        self.apply_brakes(dt);
        self.integrate_longitudinal(dt, engine_force);
        self.track_rpm(dt);
        self.velocity = self
            .velocity
            .clamp(-self.tuning.max_speed * 0.5, self.tuning.max_speed);
        self.update_turning(dt);
        self.follow_terrain(dt, ground);
    }

    /// Phase 1: steering angle moves toward a speed-weighted target, or snaps
    /// back to center inside the deadzone.
    fn update_steering(&mut self, dt: f32) {
        let speed_factor = (self.velocity.abs() / 30.0).min(1.0);
        let effective_max = self.tuning.max_steering_angle / (1.0 + 0.5 * speed_factor);
        let target = -self.steering_input * effective_max;

        if self.steering_input.abs() > STEER_DEADZONE {
            let rate = self.tuning.steer_speed * (1.0 - 0.3 * speed_factor);
            self.steering_angle += (target - self.steering_angle) * rate * dt;
        } else {
            self.steering_angle += -self.steering_angle * self.tuning.steer_return_speed * dt;
            if self.steering_angle.abs() < 0.05 {
                self.steering_angle = 0.0;
                self.angular_velocity *= 0.5;
            }
        }
    }

    /// Phase 2: handbrake accumulates a drift; releasing it is the recovery
    /// path where all drift state decays toward zero. A held handbrake below
    /// the speed threshold neither builds nor recovers.
    fn update_drift(&mut self, dt: f32) {
        if self.handbrake > 0.0 {
            let kmh = self.velocity.abs() * MS_TO_KMH;
            if kmh > self.tuning.drift_speed_threshold_kmh {
                let steering_factor = self.steering_angle * (kmh / 40.0);
                self.drift_angle +=
                    steering_factor * self.handbrake * dt * self.tuning.drift_angle_factor;
                self.drift_momentum = (self.drift_momentum + dt * 1.5).min(1.0);

                let grip_loss = self.handbrake * (1.0 - self.tuning.handbrake_grip_factor);
                self.angular_velocity += self.drift_angle * dt * 3.5;
                self.velocity *= 1.0 - grip_loss * 0.15;
                self.lateral_velocity = self.drift_angle.sin() * self.velocity * 0.9;

                // The rear stepping out eats into drive power.
                if self.throttle > 0.0 {
                    self.throttle *= 1.0 - self.handbrake * 0.3;
                }
            }
        } else {
            self.drift_angle *= self.tuning.drift_recovery_rate;
            self.drift_momentum = (self.drift_momentum - dt * 0.8).max(0.0);
            self.lateral_velocity *= self.tuning.drift_recovery_rate;
        }
    }

    /// Phase 3: slide the car along its sideways axis while drifting.
    fn integrate_lateral(&mut self, dt: f32) {
        if self.lateral_velocity.abs() > 0.01 {
            self.position.x += self.lateral_velocity * -self.heading.sin() * dt;
            self.position.z += self.lateral_velocity * self.heading.cos() * dt;
        }
    }

    /// Phase 4: the engine-force state machine. Returns the scalar forward
    /// force delivered to the wheels this tick.
    fn engine_force(&mut self, _dt: f32) -> f32 {
        // Mid-shift the engine is decoupled from the wheels and the spooled
        // power bleeds off.
        if self.gearbox.is_shifting() {
            self.power_buildup *= 0.5;
            return 0.0;
        }

        // Throttle-body lag.
        self.current_throttle +=
            (self.throttle - self.current_throttle) * self.tuning.throttle_smoothing;

        // Turbo/clutch spool: ramps under throttle, decays when released.
        if self.throttle > 0.0 {
            let increment = self.tuning.power_buildup_rate * self.current_throttle * 0.003;
            self.power_buildup = (self.power_buildup + increment).min(1.0);
        } else {
            self.power_buildup =
                (self.power_buildup - self.tuning.power_decay_rate * 0.008).max(0.0);
        }

        let kmh = self.velocity.abs() * MS_TO_KMH;
        let gear = self.gearbox.gear();
        let min_start = self.tuning.min_start_kmh(gear);

        // Higher gears cannot pull away below their minimum viable speed;
        // first and second stay exempt so the car can launch.
        if gear > 2 && kmh < min_start {
            return 0.0;
        }

        // Wheel-derived RPM for the force decisions, floored at idle. The
        // stored RPM is only written by the rate-capped tracking phase.
        let wheel_rpm = self.wheel_rpm();
        let drive_rpm = (wheel_rpm * self.gearbox.ratio(&self.tuning) * self.tuning.differential_ratio)
            .max(self.tuning.idle_rpm);
        if gear > 1 && drive_rpm < self.tuning.stall_rpm && kmh < min_start {
            return 0.0;
        }

        let mut power_factor = if gear == 1 && kmh < self.tuning.initial_power_band_kmh {
            self.launch_power_factor(kmh)
        } else {
            torque_curve(drive_rpm / self.tuning.max_rpm)
        };

        // Weak pull when lugging a gear near its stall speed.
        if min_start > 0.0 && kmh < min_start * 1.2 {
            let speed_factor = kmh / (min_start * 1.2);
            power_factor *= (speed_factor - 0.2).max(0.0);
        }

        let throttle_power = (self.current_throttle * self.power_buildup).powf(1.1);
        self.tuning.engine_power
            * power_factor
            * throttle_power
            * self.gearbox.ratio(&self.tuning)
            * self.tuning.differential_ratio
            * self.tuning.transmission_efficiency
    }

    /// First-gear launch regime below the initial power band: a clutch-slip
    /// model under 2 km/h, then a blended engagement ramp up to the band.
    /// The small engagement floor keeps the force nonzero at a standing
    /// start so the car can creep off the line.
    fn launch_power_factor(&mut self, kmh: f32) -> f32 {
        let power_factor = if kmh < 2.0 {
            self.clutch_slip = (1.0 - kmh / 2.0).max(0.0);
            let engagement = 0.25 + 0.75 * (kmh / 2.0).min(1.0);
            self.tuning.launch_power * engagement * (1.0 - self.clutch_slip * 0.7)
        } else {
            self.clutch_slip = 0.0;
            let band = self.tuning.initial_power_band_kmh;
            let speed_factor = (kmh - 2.0) / (band - 2.0);
            let ramp =
                self.tuning.launch_power + speed_factor * (1.0 - self.tuning.launch_power);
            let clutch = (kmh * self.tuning.clutch_engagement_speed).min(1.0);
            ramp * (0.4 + 0.6 * clutch)
        };
        // Throttle sensitivity at launch.
        power_factor * (0.3 + 0.7 * self.current_throttle)
    }

    /// Phase 5: braking. A low-speed band decelerates at a fixed rate and
    /// finally snaps to zero (parking-brake behavior, no numerical crawl);
    /// above it the brake force is speed-attenuated with a power-law pedal
    /// response. Never flips the sign of the velocity.
    fn apply_brakes(&mut self, dt: f32) {
        if self.brake <= 0.0 {
            return;
        }
        let kmh = self.velocity.abs() * MS_TO_KMH;
        if kmh < self.tuning.brake_low_speed_kmh {
            if self.velocity.abs() < self.tuning.brake_stop_threshold {
                self.velocity *= self.tuning.parking_brake_factor;
                if self.velocity.abs() < 0.01 {
                    self.velocity = 0.0;
                }
            } else {
                let speed = (self.velocity.abs() - self.tuning.brake_low_speed_decel * dt).max(0.0);
                self.velocity = speed.copysign(self.velocity);
            }
        } else {
            // Progressively less effective as speed rises, up to 100 km/h.
            let speed_factor = (kmh / 100.0).min(1.0);
            let brake_force = self.tuning.max_brake_force * (1.0 - speed_factor * 0.3);
            let brake_power =
                self.brake.powf(self.tuning.brake_response) * (1.0 - speed_factor * 0.2);
            let total = brake_force * brake_power * self.tuning.brake_efficiency;
            let decel = total / self.tuning.mass * (1.0 - speed_factor * 0.3);
            let speed = (self.velocity.abs() - decel * dt).max(0.0);
            self.velocity = speed.copysign(self.velocity);
        }
    }

    /// Phase 6: longitudinal integration. Net force is engine minus quadratic
    /// drag minus linear rolling resistance; the acceleration is shaped by
    /// the gear's soft speed limiter and a per-gear penalty, then applied at
    /// a damped rate. Coasting with the brake released decays the velocity
    /// multiplicatively (idle drag) — braking owns the approach to zero
    /// otherwise.
    fn integrate_longitudinal(&mut self, dt: f32, engine_force: f32) {
        let drag = self.tuning.drag_coefficient * self.velocity * self.velocity.abs();
        let rolling = self.tuning.rolling_resistance * self.velocity;
        let net_force = engine_force - drag - rolling;
        let mut accel = net_force / self.tuning.mass;

        if self.throttle > 0.0 {
            let kmh = self.velocity.abs() * MS_TO_KMH;
            let limit = self.tuning.speed_limit_kmh(self.gearbox.gear());
            if kmh > limit * GEAR_LIMITER_START {
                let window = limit * (1.0 - GEAR_LIMITER_START);
                let limit_factor = ((limit - kmh) / window).clamp(0.0, 1.0);
                accel *= limit_factor.max(0.05);
            }
            let gear_factor = 1.0 - (self.gearbox.gear() as f32 - 1.0) * 0.2;
            accel *= gear_factor.max(0.1);
            accel *= self.tuning.acceleration_factor;
        }

        // Intentionally under-applied for feel.
        self.velocity += accel * dt * 0.5;

        if self.throttle < 0.1 && self.brake <= 0.0 {
            self.velocity *= 1.0 - dt * 0.1;
        }
    }

    /// Phase 7: stored RPM approaches the wheel-derived target at a capped
    /// rate and stays clamped to the idle/max band, also mid-shift.
    fn track_rpm(&mut self, dt: f32) {
        if !self.gearbox.is_shifting() {
            let target = self.wheel_rpm()
                * self.gearbox.ratio(&self.tuning)
                * self.tuning.differential_ratio;
            let max_change = RPM_TRACK_RATE * dt;
            self.rpm += (target - self.rpm).clamp(-max_change, max_change);
        }
        self.rpm = self.rpm.clamp(self.tuning.idle_rpm, self.tuning.max_rpm);
    }

    /// Phase 9: bicycle-model turn rate with speed-dependent grip, plus
    /// cornering scrub; straight-line angular damping otherwise.
    fn update_turning(&mut self, dt: f32) {
        if self.velocity.abs() <= 0.1 {
            return;
        }
        if self.steering_angle.abs() > 1e-3 {
            let turn_radius = self.tuning.wheelbase / self.steering_angle.abs().sin();
            let mut base_rate = self.velocity / turn_radius * self.tuning.grip_factor;
            if self.steering_angle < 0.0 {
                base_rate = -base_rate.abs();
            }
            let speed_grip =
                (1.0 - (self.velocity.abs() / self.tuning.drift_threshold) * 0.4).max(0.4);
            let turn_rate = base_rate * speed_grip * self.tuning.turn_speed_factor;
            self.angular_velocity +=
                (turn_rate - self.angular_velocity) * self.tuning.turn_response * dt;
            // Cornering scrub.
            self.velocity *= 1.0 - self.steering_angle.abs() * 0.06 * dt;
        } else {
            self.angular_velocity *= self.tuning.angular_damping;
        }
    }

    /// Phase 10: integrate position against the terrain: slope speed loss,
    /// ride-height ground snap, pitch/roll probes, then heading.
    fn follow_terrain(&mut self, dt: f32, ground: &impl HeightSource) {
        let new_x = self.position.x + self.velocity * self.heading.cos() * dt;
        let new_z = self.position.z + self.velocity * self.heading.sin() * dt;

        let current_height = ground.height_at(self.position.x, self.position.z);
        let new_height = ground.height_at(new_x, new_z);

        let dx = new_x - self.position.x;
        let dz = new_z - self.position.z;
        let distance = (dx * dx + dz * dz).sqrt();
        if distance > 1e-3 {
            let slope = (new_height - current_height).atan2(distance);
            self.velocity *= 1.0 - slope.sin().abs() * 0.05;
        }

        self.position.x = new_x;
        self.position.z = new_z;
        self.position.y = new_height + self.tuning.ride_height;

        // Orientation probes ahead of and beside the car; presentation only,
        // never fed back into the dynamics.
        let front = ground.height_at(
            self.position.x + self.heading.cos() * ORIENTATION_PROBE,
            self.position.z + self.heading.sin() * ORIENTATION_PROBE,
        );
        let right = ground.height_at(
            self.position.x - self.heading.sin() * ORIENTATION_PROBE,
            self.position.z + self.heading.cos() * ORIENTATION_PROBE,
        );
        self.pitch = (front - current_height).atan2(ORIENTATION_PROBE) * 1.2;
        self.roll = (right - current_height).atan2(ORIENTATION_PROBE) * 1.2;

        self.heading += self.angular_velocity * dt;
    }

    /// Wheel rotational speed in RPM from the current ground speed.
    fn wheel_rpm(&self) -> f32 {
        self.velocity.abs() * 60.0 / (std::f32::consts::TAU * self.tuning.wheel_radius)
    }
}

/// Piecewise RPM-to-power factor modeling the torque curve: weak near idle,
/// ramping through the midrange, falling off past 70% of max RPM.
fn torque_curve(rpm_fraction: f32) -> f32 {
    if rpm_fraction < 0.2 {
        rpm_fraction * 1.5
    } else if rpm_fraction < 0.4 {
        0.3 + rpm_fraction * 0.8
    } else if rpm_fraction < 0.7 {
        0.6 + rpm_fraction * 0.4
    } else {
        1.0 - (rpm_fraction - 0.7) * 1.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::FlatGround;

    const DT: f32 = 1.0 / 60.0;

    fn car() -> Car {
        Car::new(Vec3::ZERO, VehicleTuning::default())
    }

    #[test]
    fn inputs_saturate_to_valid_ranges() {
        let mut car = car();
        car.apply_throttle(2.5);
        assert_eq!(car.throttle(), 1.0);
        car.apply_throttle(-0.5);
        assert_eq!(car.throttle(), 0.0);
        car.apply_brake(7.0);
        assert_eq!(car.brake(), 1.0);
        car.apply_steering(-3.0);
        assert_eq!(car.steering_input(), -1.0);
        car.apply_steering(0.4);
        assert_eq!(car.steering_input(), 0.4);
        car.apply_handbrake(1.7);
        assert_eq!(car.handbrake(), 1.0);
    }

    #[test]
    fn shift_down_in_first_rejected_and_state_unchanged() {
        let mut car = car();
        let before = car.snapshot();
        assert!(!car.shift_down());
        let after = car.snapshot();
        assert_eq!(after.gear, 1);
        assert_eq!(after.rpm, before.rpm);
        assert!(!car.is_shifting());
    }

    #[test]
    fn shift_up_below_optimal_rpm_rejected() {
        let mut car = car();
        assert!(car.rpm() <= car.tuning().optimal_shift_rpm);
        assert!(!car.shift_up());
        assert_eq!(car.gear(), 1);
    }

    #[test]
    fn launch_from_rest_five_seconds_in_first_gear() {
        let ground = FlatGround::default();
        let mut car = car();
        for _ in 0..300 {
            car.apply_throttle(1.0);
            car.step(DT, &ground);
        }
        assert!(car.velocity() > 0.0, "car never launched");
        assert!(car.velocity() < car.tuning().max_speed);
        assert_eq!(car.gear(), 1, "no auto-shift may occur");
    }

    #[test]
    fn speed_and_rpm_stay_bounded_through_all_gears() {
        let ground = FlatGround::default();
        let mut car = car();
        let max_speed = car.tuning().max_speed;
        let (idle, max_rpm) = (car.tuning().idle_rpm, car.tuning().max_rpm);
        for _ in 0..3600 {
            car.apply_throttle(1.0);
            if car.rpm() > car.tuning().optimal_shift_rpm + 200.0 {
                car.shift_up();
            }
            car.step(DT, &ground);
            assert!(car.velocity() <= max_speed);
            assert!(car.velocity() >= -max_speed / 2.0);
            assert!(car.rpm() >= idle && car.rpm() <= max_rpm);
        }
        assert!(car.gear() > 1, "upshifts should have been accepted");
    }

    #[test]
    fn idle_decay_is_monotonic() {
        let ground = FlatGround::default();
        let mut car = car();
        car.velocity = 10.0;
        let mut previous = car.velocity();
        for _ in 0..600 {
            car.step(DT, &ground);
            assert!(
                car.velocity() < previous,
                "coasting speed must strictly decrease"
            );
            assert!(car.velocity() >= 0.0);
            previous = car.velocity();
        }
        assert!(car.velocity() < 5.0);
    }

    #[test]
    fn drift_state_recovers_once_handbrake_released() {
        let ground = FlatGround::default();
        let mut car = car();
        car.velocity = 15.0;
        car.drift_angle = 0.5;
        car.drift_momentum = 0.8;
        car.lateral_velocity = 3.0;
        let (mut angle, mut momentum, mut lateral) =
            (car.drift_angle, car.drift_momentum, car.lateral_velocity);
        for _ in 0..240 {
            car.step(DT, &ground);
            assert!(car.drift_angle.abs() <= angle.abs());
            assert!(car.drift_momentum <= momentum);
            assert!(car.lateral_velocity.abs() <= lateral.abs());
            angle = car.drift_angle;
            momentum = car.drift_momentum;
            lateral = car.lateral_velocity;
        }
        assert!(car.drift_angle.abs() < 1e-3);
        assert!(car.drift_momentum == 0.0);
        assert!(car.lateral_velocity.abs() < 1e-3);
    }

    #[test]
    fn handbrake_at_speed_builds_drift_state() {
        let ground = FlatGround::default();
        let mut car = car();
        car.velocity = 15.0; // 54 km/h, above the drift threshold
        for _ in 0..10 {
            car.apply_steering(1.0);
            car.apply_handbrake(1.0);
            car.apply_throttle(0.5);
            car.step(DT, &ground);
        }
        assert!(car.drift_angle.abs() > 0.0);
        assert!(car.drift_momentum > 0.0);
        assert!(car.lateral_velocity.abs() > 0.0);
    }

    #[test]
    fn held_handbrake_below_threshold_freezes_drift_state() {
        let ground = FlatGround::default();
        let mut car = car();
        car.velocity = 1.0; // 3.6 km/h, below the drift speed threshold
        car.drift_angle = 0.5;
        car.drift_momentum = 0.6;
        car.lateral_velocity = 2.0;
        for _ in 0..60 {
            car.apply_handbrake(1.0);
            car.step(DT, &ground);
        }
        // Neither the build-up nor the recovery path may touch the state.
        assert_eq!(car.drift_angle, 0.5);
        assert_eq!(car.drift_momentum, 0.6);
        assert_eq!(car.lateral_velocity, 2.0);
    }

    #[test]
    fn engine_decoupled_during_shift_window() {
        let ground = FlatGround::default();
        let mut car = car();
        // Reach an upshift-eligible state in first gear.
        for _ in 0..600 {
            car.apply_throttle(1.0);
            car.step(DT, &ground);
            if car.rpm() > car.tuning().optimal_shift_rpm {
                break;
            }
        }
        assert!(car.shift_up());
        assert!(car.is_shifting());
        let before = car.velocity();
        car.apply_throttle(1.0);
        car.step(DT, &ground);
        // No engine force mid-shift; drag and rolling resistance win.
        assert!(car.velocity() < before);
    }

    #[test]
    fn high_gear_below_minimum_speed_stalls() {
        let ground = FlatGround::default();
        let mut car = car();
        let tuning = car.tuning().clone();
        // Force the gearbox into third, then crawl below its minimum speed.
        assert!(car.gearbox.shift_up(5000.0, &tuning));
        for _ in 0..30 {
            car.gearbox.tick(DT);
        }
        assert!(car.gearbox.shift_up(5000.0, &tuning));
        for _ in 0..30 {
            car.gearbox.tick(DT);
        }
        assert_eq!(car.gear(), 3);
        car.velocity = 1.0; // 3.6 km/h, far below third gear's 15 km/h
        let before = car.velocity();
        for _ in 0..60 {
            car.apply_throttle(1.0);
            car.step(DT, &ground);
        }
        assert!(car.velocity() < before, "a stalled gear must not pull");
    }

    #[test]
    fn steering_angle_never_exceeds_maximum() {
        let ground = FlatGround::default();
        let mut car = car();
        let max_angle = car.tuning().max_steering_angle;
        for tick in 0..1200 {
            car.apply_throttle(1.0);
            // Saw between full left and full right.
            car.apply_steering(if (tick / 120) % 2 == 0 { 1.0 } else { -1.0 });
            car.step(DT, &ground);
            assert!(car.steering_angle().abs() <= max_angle + 1e-6);
        }
    }

    #[test]
    fn braking_stops_without_reversing() {
        let ground = FlatGround::default();
        let mut car = car();
        car.velocity = 20.0;
        for _ in 0..1200 {
            car.apply_brake(1.0);
            car.step(DT, &ground);
            assert!(car.velocity() >= 0.0, "braking must never reverse the car");
        }
        assert_eq!(car.velocity(), 0.0);
    }

    #[test]
    fn turning_changes_heading_while_moving() {
        let ground = FlatGround::default();
        let mut car = car();
        car.velocity = 10.0;
        for _ in 0..120 {
            car.apply_throttle(0.5);
            car.apply_steering(1.0);
            car.step(DT, &ground);
        }
        assert!(car.heading().abs() > 1e-3);
    }

    #[test]
    fn snapshot_reports_kmh() {
        let mut car = car();
        car.velocity = -10.0;
        let snapshot = car.snapshot();
        assert!((snapshot.speed_kmh() - 36.0).abs() < 1e-4);
    }

    #[test]
    fn ground_snap_keeps_ride_height() {
        let ground = FlatGround { elevation: 3.5 };
        let mut car = car();
        car.step(DT, &ground);
        let expected = 3.5 + car.tuning().ride_height;
        assert!((car.position().y - expected).abs() < 1e-5);
        assert_eq!(car.snapshot().pitch, 0.0);
        assert_eq!(car.snapshot().roll, 0.0);
    }
}
