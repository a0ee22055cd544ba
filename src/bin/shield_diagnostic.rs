// Shield diagnostic: READ-ONLY test to verify the motor shield connection
//
// This tool does NOT drive the motors - it only pings the two H-bridge
// channels and reads their status registers. Use this first before running
// motor_test.
//
// Usage: cargo run --bin shield_diagnostic -- [port]

use clap::Parser;

use diffdrive_zenoh_runtime::config::MOTOR_PORT;
use diffdrive_zenoh_runtime::motor::shield::DEFAULT_BAUDRATE;
use diffdrive_zenoh_runtime::motor::ShieldMotor;

#[derive(Parser)]
#[command(about = "Read-only connectivity check for the H-bridge motor shield")]
struct Args {
    /// Serial port the shield is attached to
    #[arg(default_value = MOTOR_PORT)]
    port: String,

    /// Serial baudrate
    #[arg(long, default_value_t = DEFAULT_BAUDRATE)]
    baud: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Motor Shield Diagnostic (READ-ONLY)                 ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  This tool only READS from the shield - no movement          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Serial port: {} @ {} baud", args.port, args.baud);
    println!();

    println!("Step 1: Opening serial port...");
    let (mut left, mut right) = match ShieldMotor::open_pair_with_baudrate(&args.port, args.baud) {
        Ok(pair) => {
            println!("  ✓ Serial port opened successfully");
            pair
        }
        Err(e) => {
            println!("  ✗ Failed to open serial port: {}", e);
            println!();
            println!("Troubleshooting:");
            println!("  - Check the port path is correct");
            println!("  - Verify the USB cable is connected");
            println!("  - Check your user has permission on the serial device");
            return Err(e.into());
        }
    };
    println!();

    println!("Step 2: Pinging H-bridge channels...");
    let mut all_found = true;
    for (name, motor) in [("Left", &mut left), ("Right", &mut right)] {
        print!("  Channel {} ({}): ", motor.channel(), name);
        match motor.ping() {
            Ok(true) => println!("✓ RESPONDING"),
            Ok(false) => {
                println!("✗ NO RESPONSE");
                all_found = false;
            }
            Err(e) => {
                println!("✗ ERROR: {}", e);
                all_found = false;
            }
        }
    }
    println!();

    if !all_found {
        println!("⚠ WARNING: Not all channels responded!");
        println!("Check the shield wiring and power before going further.");
        return Ok(());
    }

    println!("Step 3: Reading status registers...");
    for (name, motor) in [("Left", &mut left), ("Right", &mut right)] {
        match motor.status() {
            Ok(0) => println!("  ✓ Channel {} ({}) healthy", motor.channel(), name),
            Ok(status) => println!(
                "  ⚠ Channel {} ({}) fault flags: 0x{:02X}",
                motor.channel(),
                name,
                status
            ),
            Err(e) => println!("  ✗ Channel {} ({}) error: {}", motor.channel(), name, e),
        }
    }
    println!();

    println!("Diagnostic complete. If both channels respond you can run:");
    println!("  cargo run --bin motor_test -- {}", args.port);

    Ok(())
}
