// Timeouts, topics, motor configuration
use std::time::Duration;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Command timeout for watchdog
pub const CMD_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD_DRIVE: &str = "diffbot/cmd/drive"; // commands
pub const TOPIC_RT_DRIVE: &str = "diffbot/rt/drive"; // actuation
pub const TOPIC_HEALTH: &str = "diffbot/state/health"; // health status

// Motor configuration
// Serial port for the H-bridge motor shield
pub const MOTOR_PORT: &str = "/dev/ttyUSB0";

// Enable hardware motor control (set to false for simulation/testing)
pub const MOTOR_ENABLED: bool = true;
