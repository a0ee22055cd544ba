// High-level drive sequencer for the two-wheel base
//
// Combines the steering geometry with two wheel motors to provide a simple
// steer-by-angle API, and enforces a stop-and-settle pause whenever the
// travel direction flips between forward and backward.

use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, warn};

use super::steering::{DEFAULT_MAX_SPEED, DEFAULT_MIN_SPEED, SteeringGeometry};
use super::{Rotation, WheelMotor};

/// Settle time between stopping the wheels and driving them the other way
pub const REVERSE_SETTLE: Duration = Duration::from_millis(500);

/// Open-loop differential-drive sequencer.
///
/// Owns the two wheel motors for its lifetime. Each `steer` call is a single
/// command issuance with no feedback; the only state carried across calls is
/// the previous travel direction, used to detect reversals.
pub struct DifferentialDrive<M: WheelMotor> {
    left: M,
    right: M,
    geometry: SteeringGeometry,
    was_backward: bool,
    settle: Duration,
}

impl<M: WheelMotor> DifferentialDrive<M> {
    /// Create a sequencer with the default calibration (full-scale max
    /// speed, half-scale min speed).
    ///
    /// Both motors are initialized to the max-speed duty cycle and left
    /// coasting.
    pub fn new(left: M, right: M) -> Result<Self, M::Error> {
        Self::with_calibration(left, right, DEFAULT_MAX_SPEED, DEFAULT_MIN_SPEED)
    }

    /// Create with custom duty-cycle bounds (each 0..=255).
    ///
    /// `max_speed` is clamped up to `min_speed` if passed reversed.
    pub fn with_calibration(
        left: M,
        right: M,
        max_speed: u8,
        min_speed: u8,
    ) -> Result<Self, M::Error> {
        let geometry = SteeringGeometry::new(max_speed, min_speed);

        let mut drive = Self {
            left,
            right,
            geometry,
            was_backward: false,
            settle: REVERSE_SETTLE,
        };

        drive.left.set_duty_cycle(drive.geometry.max_speed())?;
        drive.left.set_rotation(Rotation::Neutral)?;
        drive.right.set_duty_cycle(drive.geometry.max_speed())?;
        drive.right.set_rotation(Rotation::Neutral)?;

        Ok(drive)
    }

    /// Override the blocking settle delay applied on a direction reversal
    pub fn set_settle_delay(&mut self, settle: Duration) {
        self.settle = settle;
    }

    pub fn geometry(&self) -> &SteeringGeometry {
        &self.geometry
    }

    /// Issue one cycle of wheel commands for a steering command.
    ///
    /// `direction` is in -180..=180: the sign is the travel direction, the
    /// magnitude the turn angle (90 = straight, toward 0 = right, toward
    /// 180 = left). `speed_rate` is in 0.0..=1.0. Values outside those
    /// ranges are caller contract violations.
    ///
    /// When the travel direction has flipped since the previous call, both
    /// wheels are set to coast and the calling thread blocks for the settle
    /// delay; no drive command is issued that cycle.
    pub fn steer(&mut self, direction: i16, speed_rate: f32) -> Result<(), M::Error> {
        let is_backward = direction < 0;
        let magnitude = direction.unsigned_abs();

        let (is_left, angle) = if magnitude > 90 {
            (true, (90 - magnitude % 90) as u8)
        } else {
            (false, magnitude as u8)
        };

        if is_backward != self.was_backward {
            // Stop fully before going the other way: reversing a DC motor
            // against its own momentum stresses the driver and the gearbox.
            debug!("travel direction reversed, stopping wheels");
            self.was_backward = is_backward;
            self.left.set_rotation(Rotation::Neutral)?;
            self.right.set_rotation(Rotation::Neutral)?;
            sleep(self.settle);
            return Ok(());
        }

        let speeds = self.geometry.wheel_speeds(angle, speed_rate);
        debug!(
            "steer dir={} rate={}: inner={} outer={} reversed={}",
            direction, speed_rate, speeds.inner, speeds.outer, speeds.inner_reversed
        );

        let inner_rotation = if is_backward == speeds.inner_reversed {
            Rotation::Forward
        } else {
            Rotation::Backward
        };
        let outer_rotation = if is_backward {
            Rotation::Backward
        } else {
            Rotation::Forward
        };

        if is_left {
            Self::issue(&mut self.left, &self.geometry, speeds.inner, inner_rotation)?;
            Self::issue(&mut self.right, &self.geometry, speeds.outer, outer_rotation)?;
        } else {
            Self::issue(&mut self.right, &self.geometry, speeds.inner, inner_rotation)?;
            Self::issue(&mut self.left, &self.geometry, speeds.outer, outer_rotation)?;
        }

        Ok(())
    }

    /// Set both wheels coasting immediately
    pub fn stop(&mut self) -> Result<(), M::Error> {
        self.left.set_rotation(Rotation::Neutral)?;
        self.right.set_rotation(Rotation::Neutral)
    }

    /// Drive one wheel, or coast it when the computed speed is below the
    /// minimum effective duty cycle (sub-threshold duty stalls and buzzes
    /// the motor instead of turning it).
    fn issue(
        motor: &mut M,
        geometry: &SteeringGeometry,
        speed: u16,
        rotation: Rotation,
    ) -> Result<(), M::Error> {
        if speed >= u16::from(geometry.min_speed()) {
            let duty = u8::try_from(speed).unwrap_or(u8::MAX);
            motor.set_duty_cycle(duty)?;
            motor.set_rotation(rotation)
        } else {
            motor.set_rotation(Rotation::Neutral)
        }
    }
}

impl<M: WheelMotor> Drop for DifferentialDrive<M> {
    fn drop(&mut self) {
        // Try to stop the wheels when the sequencer goes away (safety measure)
        if let Err(e) = self.stop() {
            warn!("Failed to stop motors on drop: {}", e);
        }
    }
}
