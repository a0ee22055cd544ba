// Motor control module for the differential-drive base
//
// Provides:
// - Steering geometry (turn angle + speed rate -> inner/outer wheel speeds)
// - Serial protocol for the dual H-bridge motor shield
// - High-level drive sequencer issuing per-wheel commands

mod driver;
pub mod shield;
pub mod steering;

pub use driver::DifferentialDrive;
pub use shield::{CHANNEL_LEFT, CHANNEL_RIGHT, ShieldError, ShieldMotor};
pub use steering::{SteeringGeometry, WheelSpeeds};

/// Rotation command accepted by a wheel motor.
///
/// `Neutral` lets the wheel coast; it is also the safe state issued while
/// waiting out a travel-direction reversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    Forward,
    Backward,
    #[default]
    Neutral,
}

/// One drive wheel's motor, as seen by the sequencer.
///
/// The surrounding application supplies two implementations, one per wheel;
/// the sequencer owns them exclusively for its lifetime.
pub trait WheelMotor {
    type Error: std::error::Error;

    /// Set the PWM duty cycle (0..=255) applied when the wheel is driven
    fn set_duty_cycle(&mut self, duty: u8) -> Result<(), Self::Error>;

    /// Set the rotation mode: drive forward, drive backward, or coast
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error>;
}
