//! Gear-change state machine.
//!
//! Two states: ENGAGED (driving normally) and SHIFTING (engine decoupled from
//! the wheels for a fixed window). The gear index advances immediately on an
//! accepted shift; the SHIFTING timer only gates force delivery and RPM
//! tracking. SHIFTING returns to ENGAGED on its own once the timer elapses.

use crate::tuning::VehicleTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ShiftState {
    Engaged,
    Shifting { remaining: f32 },
}

/// Transmission state: current gear plus the shift window.
#[derive(Debug, Clone)]
pub struct Gearbox {
    /// 1-based index into the tuning's gear-ratio table.
    gear: usize,
    state: ShiftState,
}

impl Default for Gearbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Gearbox {
    pub fn new() -> Self {
        Self {
            gear: 1,
            state: ShiftState::Engaged,
        }
    }

    /// Current gear, 1-based. Always within `[1, tuning.gear_count()]`.
    pub fn gear(&self) -> usize {
        self.gear
    }

    /// Whether a gear change is in progress.
    pub fn is_shifting(&self) -> bool {
        matches!(self.state, ShiftState::Shifting { .. })
    }

    /// Ratio of the currently selected gear.
    pub fn ratio(&self, tuning: &VehicleTuning) -> f32 {
        tuning.ratio(self.gear)
    }

    /// Advance the shift timer; returns to ENGAGED when it elapses.
    pub fn tick(&mut self, dt: f32) {
        if let ShiftState::Shifting { remaining } = &mut self.state {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.state = ShiftState::Engaged;
            }
        }
    }

    /// Request an upshift. Accepted only when engaged, a higher gear exists,
    /// and the engine is revving above the optimal shift point. Returns
    /// whether the shift was taken, so the caller can apply its own cooldown
    /// only on success.
    pub fn shift_up(&mut self, rpm: f32, tuning: &VehicleTuning) -> bool {
        if self.is_shifting() || self.gear >= tuning.gear_count() {
            return false;
        }
        if rpm <= tuning.optimal_shift_rpm {
            return false;
        }
        self.gear += 1;
        self.state = ShiftState::Shifting {
            remaining: tuning.shift_duration,
        };
        log::debug!("shifted up to gear {}", self.gear);
        true
    }

    /// Request a downshift. Accepted only when engaged, a lower gear exists,
    /// and the projected RPM in the lower gear stays under redline.
    pub fn shift_down(&mut self, rpm: f32, tuning: &VehicleTuning) -> bool {
        if self.is_shifting() || self.gear <= 1 {
            return false;
        }
        let projected_rpm = rpm * (tuning.ratio(self.gear - 1) / tuning.ratio(self.gear));
        if projected_rpm >= tuning.redline_rpm {
            return false;
        }
        self.gear -= 1;
        self.state = ShiftState::Shifting {
            remaining: tuning.shift_duration,
        };
        log::debug!("shifted down to gear {}", self.gear);
        true
    }
}
