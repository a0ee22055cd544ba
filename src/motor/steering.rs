// Differential-drive steering geometry.
// Converts a folded turn angle (0..=90 degrees, 90 = straight ahead) and a
// speed rate into independent inner/outer wheel speeds.

/// Full motor duty-cycle scale (8-bit PWM)
pub const FULL_SCALE: u8 = 255;

/// Width in degrees of the dead zone below the spin threshold where the
/// inner wheel is held stopped instead of driven or reversed
pub const STOP_BAND: u8 = 10;

/// Default calibration: full-scale max, half-scale min
pub const DEFAULT_MAX_SPEED: u8 = FULL_SCALE;
pub const DEFAULT_MIN_SPEED: u8 = FULL_SCALE / 2;

/// Computed speeds for one steering command.
///
/// Speeds are kept unclamped here; gating against the minimum effective
/// speed and saturation to the 8-bit duty range happen when the command
/// is issued to the motors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelSpeeds {
    pub inner: u16,
    pub outer: u16,
    pub inner_reversed: bool,
}

/// Calibration profile for the steering model, derived once and immutable.
#[derive(Debug, Clone, Copy)]
pub struct SteeringGeometry {
    min_speed: u8,
    max_speed: u8,
    max_spin_speed: u8,
    start_spin_angle: u8,
}

impl SteeringGeometry {
    /// Derive a calibration profile from the duty-cycle bounds.
    ///
    /// `max_speed` is clamped up to `min_speed` if the caller passes them
    /// reversed. A narrow usable speed band yields a larger spin threshold
    /// (more of the turn range spent pivoting); the full band yields a
    /// smaller one.
    pub fn new(max_speed: u8, min_speed: u8) -> Self {
        let max_speed = max_speed.max(min_speed);

        let max_spin_speed = min_speed + (max_speed - min_speed) / 2;

        let angle_range = 90.0 * f32::from(FULL_SCALE - min_speed) / f32::from(FULL_SCALE);
        let min_angle = 45.0 - angle_range / 2.0;
        let usable = f32::from(max_speed - min_speed) / f32::from(FULL_SCALE - min_speed);
        let start_spin_angle = (min_angle + angle_range * (1.0 - usable)).round() as u8;

        Self {
            min_speed,
            max_speed,
            max_spin_speed,
            start_spin_angle,
        }
    }

    pub fn min_speed(&self) -> u8 {
        self.min_speed
    }

    pub fn max_speed(&self) -> u8 {
        self.max_speed
    }

    pub fn max_spin_speed(&self) -> u8 {
        self.max_spin_speed
    }

    /// Turn-angle threshold below which the inner wheel leaves the forward
    /// regime: first the dead zone, then reversed to spin the robot on its
    /// axis
    pub fn start_spin_angle(&self) -> u8 {
        self.start_spin_angle
    }

    /// Compute inner/outer wheel speeds for a folded turn angle.
    ///
    /// `angle` is in 0..=90 where 90 is straight ahead and 0 is the
    /// tightest turn; `speed_rate` scales both wheels linearly.
    ///
    /// The outer formula intentionally uses the raw angle rather than the
    /// offset from the spin threshold, so it overshoots `max_speed` near 90
    /// and sits above `max_spin_speed` at the threshold. That is the
    /// calibrated behavior; the overshoot saturates at duty-cycle issuance.
    pub fn wheel_speeds(&self, angle: u8, speed_rate: f32) -> WheelSpeeds {
        let angle = i32::from(angle);
        let min = i32::from(self.min_speed);
        let max = i32::from(self.max_speed);
        let spin = i32::from(self.max_spin_speed);
        let start = i32::from(self.start_spin_angle);
        let reverse_band = start - i32::from(STOP_BAND);

        let outer_ramp = spin + angle * (max - spin) / (90 - start);
        let outer = (speed_rate * outer_ramp as f32).round() as u16;

        let (inner, inner_reversed) = if angle < reverse_band {
            // Pivot regime: reverse magnitude is max_spin_speed at angle 0
            // (symmetric against the outer wheel) and ramps down to
            // min_speed at the dead-zone boundary.
            let ramp = min + (reverse_band - angle) * (spin - min) / reverse_band;
            ((speed_rate * ramp as f32).round() as u16, true)
        } else if angle < start {
            (0, false)
        } else {
            let ramp = min + (angle - start) * (max - min) / (90 - start);
            ((speed_rate * ramp as f32).round() as u16, false)
        };

        WheelSpeeds {
            inner,
            outer,
            inner_reversed,
        }
    }
}

impl Default for SteeringGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEED, DEFAULT_MIN_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration() {
        let geometry = SteeringGeometry::default();
        assert_eq!(geometry.min_speed(), 127);
        assert_eq!(geometry.max_speed(), 255);
        assert_eq!(geometry.max_spin_speed(), 191);
        assert_eq!(geometry.start_spin_angle(), 22);
    }

    #[test]
    fn test_spin_speed_between_bounds() {
        for (max, min) in [(255, 127), (255, 0), (200, 150), (130, 127), (127, 127)] {
            let geometry = SteeringGeometry::new(max, min);
            assert!(
                geometry.max_spin_speed() >= geometry.min_speed(),
                "spin speed below min for ({max}, {min})"
            );
            assert!(
                geometry.max_spin_speed() <= geometry.max_speed(),
                "spin speed above max for ({max}, {min})"
            );
        }
    }

    #[test]
    fn test_reversed_bounds_clamp_max_to_min() {
        let geometry = SteeringGeometry::new(100, 150);
        assert_eq!(geometry.max_speed(), 150);
        assert_eq!(geometry.min_speed(), 150);
        assert_eq!(geometry.max_spin_speed(), 150);
    }

    #[test]
    fn test_straight_ahead_full_rate() {
        let geometry = SteeringGeometry::default();
        let speeds = geometry.wheel_speeds(90, 1.0);

        // Inner lands exactly on max_speed. Outer overshoots it (raw-angle
        // formula); issuance saturates it back to 255.
        assert_eq!(speeds.inner, 255);
        assert_eq!(speeds.outer, 275);
        assert!(!speeds.inner_reversed);
    }

    #[test]
    fn test_tightest_turn_is_symmetric_pivot() {
        let geometry = SteeringGeometry::default();
        let speeds = geometry.wheel_speeds(0, 1.0);

        assert!(speeds.inner_reversed);
        assert_eq!(speeds.inner, u16::from(geometry.max_spin_speed()));
        assert_eq!(speeds.outer, u16::from(geometry.max_spin_speed()));
    }

    #[test]
    fn test_reverse_ramp_reaches_min_at_dead_zone() {
        let geometry = SteeringGeometry::default();

        // Last reversed angle before the dead zone: 22 - 10 - 1 = 11
        let speeds = geometry.wheel_speeds(11, 1.0);
        assert!(speeds.inner_reversed);
        assert_eq!(speeds.inner, 132);
    }

    #[test]
    fn test_dead_zone_stops_inner_wheel() {
        let geometry = SteeringGeometry::default();

        // [start - STOP_BAND, start) = [12, 22) with default calibration
        for angle in 12..22 {
            let speeds = geometry.wheel_speeds(angle, 1.0);
            assert_eq!(speeds.inner, 0, "inner not stopped at angle {angle}");
            assert!(!speeds.inner_reversed);
            assert!(speeds.outer > 0, "outer stopped at angle {angle}");
        }
    }

    #[test]
    fn test_forward_ramp_starts_at_min_speed() {
        let geometry = SteeringGeometry::default();

        let speeds = geometry.wheel_speeds(22, 1.0);
        assert!(!speeds.inner_reversed);
        assert_eq!(speeds.inner, u16::from(geometry.min_speed()));
    }

    #[test]
    fn test_mid_turn_values() {
        let geometry = SteeringGeometry::default();
        let speeds = geometry.wheel_speeds(45, 1.0);

        assert_eq!(speeds.inner, 170);
        assert_eq!(speeds.outer, 233);
        assert!(!speeds.inner_reversed);
    }

    #[test]
    fn test_speed_rate_scales_both_wheels() {
        let geometry = SteeringGeometry::default();
        let full = geometry.wheel_speeds(45, 1.0);
        let half = geometry.wheel_speeds(45, 0.5);

        assert_eq!(half.inner, 85);
        assert_eq!(half.outer, 117);
        assert!(half.inner < full.inner);
        assert!(half.outer < full.outer);
    }

    #[test]
    fn test_zero_rate_stops_everything() {
        let geometry = SteeringGeometry::default();
        let speeds = geometry.wheel_speeds(45, 0.0);
        assert_eq!(speeds.inner, 0);
        assert_eq!(speeds.outer, 0);
    }
}
