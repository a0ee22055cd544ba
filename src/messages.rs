// Message types exchanged over Zenoh

use serde::{Deserialize, Serialize};

// Steering command from teleop/scripts -> runtime.
// direction: -180..=180, sign = travel direction, magnitude = turn angle
// (90 = straight, toward 0 = right, toward 180 = left).
// speed_rate: 0.0..=1.0, linear scale applied to both wheels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveCommand {
    pub direction: i16,
    pub speed_rate: f32,
}

// Actuation echo from runtime -> observers.
// Defaults to zero so there is always something safe to actuate and publish.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DriveActuation {
    pub direction: i16,
    pub speed_rate: f32,
}

impl From<&DriveCommand> for DriveActuation {
    fn from(cmd: &DriveCommand) -> Self {
        Self {
            direction: cmd.direction,
            speed_rate: cmd.speed_rate,
        }
    }
}

/// Health status published by the runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
    MotorFault,
}
