//! Scripted drive standing in for an interactive input layer.

use vehicle::Car;

/// End of the full-throttle acceleration run, seconds.
const ACCEL_END: f32 = 20.0;
/// End of the steering sweep.
const SWEEP_END: f32 = 28.0;
/// End of the handbrake drift.
const DRIFT_END: f32 = 31.0;
/// RPM margin over the optimal shift point before requesting an upshift.
const UPSHIFT_MARGIN: f32 = 150.0;

/// Deterministic input schedule: launch and accelerate up through the gears,
/// sweep the steering, kick the tail out on the handbrake, then brake to a
/// stop. Shift requests honor a cooldown that is consumed only when the
/// gearbox accepts the shift, mirroring an interactive input handler.
pub struct DriveScript {
    shift_cooldown: f32,
    cooldown_remaining: f32,
}

impl DriveScript {
    pub fn new(shift_cooldown: f32) -> Self {
        Self { shift_cooldown, cooldown_remaining: 0.0 }
    }

    /// Apply this tick's inputs to the car. `t` is simulated time in seconds.
    pub fn drive(&mut self, t: f32, dt: f32, car: &mut Car) {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);

        if t < ACCEL_END {
            car.apply_throttle(1.0);
            car.apply_brake(0.0);
            car.apply_steering(0.0);
            car.apply_handbrake(0.0);
            self.try_upshift(car);
        } else if t < SWEEP_END {
            car.apply_throttle(0.6);
            car.apply_brake(0.0);
            car.apply_steering((t * 0.8).sin());
            car.apply_handbrake(0.0);
            self.try_upshift(car);
        } else if t < DRIFT_END {
            car.apply_throttle(0.4);
            car.apply_brake(0.0);
            car.apply_steering(1.0);
            car.apply_handbrake(1.0);
        } else {
            car.apply_throttle(0.0);
            car.apply_brake(1.0);
            car.apply_steering(0.0);
            car.apply_handbrake(0.0);
            self.try_downshift(car);
        }
    }

    fn try_upshift(&mut self, car: &mut Car) {
        if self.cooldown_remaining > 0.0 {
            return;
        }
        if car.rpm() > car.tuning().optimal_shift_rpm + UPSHIFT_MARGIN && car.shift_up() {
            self.cooldown_remaining = self.shift_cooldown;
        }
    }

    /// Drop a gear once the car slows past the current gear's minimum
    /// workable speed.
    fn try_downshift(&mut self, car: &mut Car) {
        if self.cooldown_remaining > 0.0 {
            return;
        }
        let gear = car.gear();
        if gear <= 1 {
            return;
        }
        let kmh = car.snapshot().speed_kmh();
        if kmh < car.tuning().min_start_kmh(gear) * 1.1 && car.shift_down() {
            self.cooldown_remaining = self.shift_cooldown;
        }
    }
}
