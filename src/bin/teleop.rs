// Keyboard teleop: WASD steer, Z/X pivot, R/F speed, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::info;

use diffdrive_zenoh_runtime::config::TOPIC_CMD_DRIVE;

const RATES: [f32; 3] = [0.55, 0.75, 1.0]; // speed rate tiers
const INPUT_TIMEOUT_MS: u64 = 100; // Reset speed after this much time with no input

// Steering directions: 90 = straight, toward 0 = right, toward 180 = left,
// negative = backward
const DIR_STRAIGHT: i16 = 90;
const DIR_VEER_LEFT: i16 = 135;
const DIR_VEER_RIGHT: i16 = 45;
const DIR_PIVOT_LEFT: i16 = 175;
const DIR_PIVOT_RIGHT: i16 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_DRIVE).await?;

    info!("Controls: W/S=forward/backward, A/D=veer, Z/X=pivot, R/F=speed, Q=quit");
    info!("Speed: LOW");

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut rate_idx: usize = 0;

    // Persistent steering state
    let mut direction: i16 = DIR_STRAIGHT;
    let mut speed_rate: f32 = 0.0;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Movement - update steering and refresh timestamp
                    KeyCode::Char('w') if pressed => {
                        direction = DIR_STRAIGHT;
                        speed_rate = RATES[rate_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        direction = -DIR_STRAIGHT;
                        speed_rate = RATES[rate_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        direction = DIR_VEER_LEFT;
                        speed_rate = RATES[rate_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        direction = DIR_VEER_RIGHT;
                        speed_rate = RATES[rate_idx];
                        last_movement_input = Instant::now();
                    }

                    // Pivot in place
                    KeyCode::Char('z') if pressed => {
                        direction = DIR_PIVOT_LEFT;
                        speed_rate = RATES[rate_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('x') if pressed => {
                        direction = DIR_PIVOT_RIGHT;
                        speed_rate = RATES[rate_idx];
                        last_movement_input = Instant::now();
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        rate_idx = (rate_idx + 1).min(2);
                        print_speed(rate_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        rate_idx = rate_idx.saturating_sub(1);
                        print_speed(rate_idx);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Reset speed if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            speed_rate = 0.0;
        }

        // Always publish at ~50Hz
        let cmd = json!({
            "direction": direction,
            "speed_rate": speed_rate
        });
        publisher.put(cmd.to_string()).await?;
    }

    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
