// Motor test: Careful, step-by-step test for the drive sequencer
//
// IMPORTANT: Run shield_diagnostic FIRST to verify read-only communication.
//
// Usage: cargo run --bin motor_test -- [port]
//
// Safety features:
// - Explicit confirmation before any writes
// - Starts with a zero speed rate (no movement)
// - Very slow test speeds
// - Easy abort with Ctrl+C

use clap::Parser;
use std::io::{self, Write};
use std::thread::sleep;
use std::time::Duration;

use diffdrive_zenoh_runtime::config::MOTOR_PORT;
use diffdrive_zenoh_runtime::motor::{DifferentialDrive, ShieldMotor};

// Just above the duty-cycle threshold with the default calibration, so the
// wheels creep rather than run
const TEST_RATE: f32 = 0.55;

#[derive(Parser)]
#[command(about = "Guarded motion test for the drive sequencer (WILL move the wheels)")]
struct Args {
    /// Serial port the shield is attached to
    #[arg(default_value = MOTOR_PORT)]
    port: String,
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().eq_ignore_ascii_case("y")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Drive Motor Test (WITH MOVEMENT)                ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  ⚠  This tool WILL drive the wheels!                         ║");
    println!("║  ⚠  Make sure wheels are OFF THE GROUND before proceeding!   ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Serial port: {}", args.port);
    println!();

    if !confirm("Have you run shield_diagnostic first and verified both channels respond?") {
        println!("Please run: cargo run --bin shield_diagnostic -- {}", args.port);
        return Ok(());
    }

    if !confirm("Are the robot's wheels OFF THE GROUND (robot elevated/on blocks)?") {
        println!("Please elevate the robot so wheels can spin freely without moving the robot.");
        return Ok(());
    }

    println!();
    println!("Opening serial port...");
    let (mut left, mut right) = ShieldMotor::open_pair(&args.port)?;
    println!("✓ Connected");
    println!();

    // ========== STEP 1: Verify communication (read-only) ==========
    println!("Step 1: Verifying shield communication (read-only)...");
    for (name, motor) in [("Left", &mut left), ("Right", &mut right)] {
        match motor.ping() {
            Ok(true) => println!("  ✓ Channel {} ({}) responding", motor.channel(), name),
            Ok(false) => {
                println!(
                    "  ✗ Channel {} ({}) NOT responding - aborting",
                    motor.channel(),
                    name
                );
                return Ok(());
            }
            Err(e) => {
                println!(
                    "  ✗ Channel {} ({}) error: {} - aborting",
                    motor.channel(),
                    name,
                    e
                );
                return Ok(());
            }
        }
    }
    println!();

    // ========== STEP 2: Construct the sequencer ==========
    println!("Step 2: Initializing the drive sequencer...");
    println!("  This sets both channels to max duty and leaves them coasting.");
    println!();

    if !confirm("Proceed with sequencer initialization?") {
        println!("Aborted.");
        return Ok(());
    }

    let mut drive = DifferentialDrive::new(left, right)?;
    println!("  ✓ Sequencer initialized (wheels coasting)");
    println!();

    // ========== STEP 3: Zero speed rate ==========
    println!("Step 3: Steering with a ZERO speed rate...");
    println!("  This should NOT cause any movement.");
    println!();

    if !confirm("Send zero-rate steering command?") {
        drive.stop()?;
        return Ok(());
    }

    drive.steer(90, 0.0)?;
    println!("  ✓ Zero-rate command sent");
    sleep(Duration::from_millis(500));
    println!();

    // ========== STEP 4: Very slow motion test ==========
    println!("Step 4: Very slow motion test");
    println!("  Speed rate: {} (just above the effective minimum)", TEST_RATE);
    println!("  Duration: 1 second per step");
    println!();
    println!("  ⚠  WATCH THE WHEELS - they should turn slowly!");
    println!("  ⚠  Press Ctrl+C at any time to abort!");
    println!();

    if !confirm("Proceed with motion test?") {
        drive.stop()?;
        return Ok(());
    }

    let step_duration = Duration::from_secs(1);
    let pause_duration = Duration::from_millis(500);

    // Each step goes through the full steering path, including the
    // stop-and-settle on the forward/backward flips
    let steps = [
        ("Forward straight", 90, TEST_RATE),
        ("Forward veer right", 45, TEST_RATE),
        ("Forward veer left", 135, TEST_RATE),
        ("Backward straight (expect settle pause)", -90, TEST_RATE),
        ("Forward again (expect settle pause)", 90, TEST_RATE),
    ];

    for (name, direction, rate) in steps {
        println!("  Testing: {}...", name);

        // A call that lands on a forward/backward flip only stops and
        // settles; the second call issues the actual drive command.
        drive.steer(direction, rate)?;
        drive.steer(direction, rate)?;
        sleep(step_duration);

        // Coast between steps
        drive.stop()?;
        sleep(pause_duration);
    }

    // ========== FINAL: Stop and cleanup ==========
    println!();
    println!("Step 5: Stopping wheels...");
    drive.stop()?;
    println!("  ✓ Wheels coasting");

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Test Complete!                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("If the wheels moved as expected, the drive path is working correctly.");
    println!("You can now try the full runtime with: cargo run");

    Ok(())
}
