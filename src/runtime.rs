// 50 Hz loop with watchdog
// If teleop crashes and stops sending commands, the watchdog actuates the
// all-zero command, which the drive sequencer turns into coast on both wheels.

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{info, warn};

use crate::config::{
    CMD_TIMEOUT, LOOP_HZ, MOTOR_ENABLED, MOTOR_PORT, TOPIC_CMD_DRIVE, TOPIC_HEALTH, TOPIC_RT_DRIVE,
};
use crate::messages::{DriveActuation, DriveCommand, RuntimeHealth};
use crate::motor::{DifferentialDrive, ShieldMotor};

pub struct Runtime {
    latest_cmd: Option<DriveCommand>,
    cmd_received_at: Instant,
    health: RuntimeHealth,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            latest_cmd: None,
            cmd_received_at: Instant::now(),
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
        }
    }

    /// Process incoming command
    fn on_command(&mut self, cmd: DriveCommand) {
        info!("Received command: {:?}", &cmd);
        self.latest_cmd = Some(cmd);
        self.cmd_received_at = Instant::now();
    }

    /// Compute actuation based on watchdog state
    fn compute_actuation(&mut self) -> DriveActuation {
        let cmd_age = self.cmd_received_at.elapsed();

        if cmd_age > CMD_TIMEOUT {
            // Watchdog triggered - stop the robot
            if self.health != RuntimeHealth::CmdStale {
                warn!("Command stale ({:?} old), stopping robot", cmd_age);
            }
            self.health = RuntimeHealth::CmdStale;
            DriveActuation::default() // Zero speed rate
        } else if let Some(ref cmd) = self.latest_cmd {
            self.health = RuntimeHealth::Ok;
            DriveActuation::from(cmd)
        } else {
            // No command ever received
            self.health = RuntimeHealth::CmdStale;
            DriveActuation::default()
        }
    }

    fn on_motor_fault(&mut self) {
        self.health = RuntimeHealth::MotorFault;
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(TOPIC_CMD_DRIVE).await?;
    let pub_actuation = session.declare_publisher(TOPIC_RT_DRIVE).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let mut drive = if MOTOR_ENABLED {
        info!("Opening motor shield on {}", MOTOR_PORT);
        let (left, right) = ShieldMotor::open_pair(MOTOR_PORT)?;
        Some(DifferentialDrive::new(left, right)?)
    } else {
        info!("Motor control disabled, running publish-only");
        None
    };

    let mut runtime = Runtime::new();
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        LOOP_HZ,
        CMD_TIMEOUT.as_millis()
    );
    info!("Subscribed to: {}", TOPIC_CMD_DRIVE);
    info!("Publishing to: {}, {}", TOPIC_RT_DRIVE, TOPIC_HEALTH);

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking), keep latest
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<DriveCommand>(&payload) {
                Ok(cmd) => {
                    runtime.on_command(cmd);
                }
                Err(e) => {
                    warn!("Failed to parse command: {}", e);
                }
            }
        }

        // 2. Compute actuation (includes watchdog logic)
        let actuation = runtime.compute_actuation();

        // 3. Apply actuation to the wheels. A travel-direction reversal
        // blocks this tick for the settle delay; the loop catches up on the
        // next tick.
        if let Some(drive) = drive.as_mut() {
            if let Err(e) = drive.steer(actuation.direction, actuation.speed_rate) {
                warn!("Motor command failed: {}", e);
                runtime.on_motor_fault();
            }
        }

        // 4. Publish actuation
        let actuation_json = serde_json::to_string(&actuation)?;
        pub_actuation.put(actuation_json).await?;

        // 5. Publish health
        let health_json = serde_json::to_string(&runtime.health)?;
        pub_health.put(health_json).await?;
    }
}
