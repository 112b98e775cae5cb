//! line_rover firmware entry point
//!
//! Loads configuration from an optional TOML file and `ROVER_*` variables,
//! connects to the coordinator and runs the control loop against the
//! simulated robot.
//!
//! Usage: ROVER_SERVER_HOST=192.168.0.10 ROVER_LOG=debug cargo run --bin line_rover [rover.toml]

use std::iter;
use std::path::PathBuf;
use std::time::Duration;

use line_rover::communication::transport::UdpDatagramTransport;
use line_rover::communication::{CommandChannel, TelemetryChannel};
use line_rover::platform::{SimulatedRobot, StdTime};
use line_rover::rover::LineFollower;
use line_rover::runtime::{ControlLoop, RobotPose};
use line_rover::{log_error, log_info, log_warn, logging, RobotConfig, RoverError};
use line_rover_core::sensors::SensorSnapshot;

/// Sensor readings for one lap of the demo track, one per cycle
fn demo_course() -> Vec<SensorSnapshot> {
    let segments: [(u8, usize); 8] = [
        (0b00100, 40),
        (0b01100, 6),
        (0b00100, 30),
        (0b00110, 6),
        (0b00100, 30),
        (0b11111, 2),
        (0b00000, 15),
        (0b01100, 4),
    ];

    segments
        .iter()
        .flat_map(|&(bits, cycles)| iter::repeat(SensorSnapshot::from_bits(bits)).take(cycles))
        .collect()
}

fn run() -> Result<(), RoverError> {
    let file = std::env::args_os().nth(1).map(PathBuf::from);
    let config = RobotConfig::load(file.as_deref())?;
    log_info!(
        "Robot {} starting, coordinator {}",
        config.robot_id,
        config.command_addr()
    );

    let time = StdTime::new();
    let robot = SimulatedRobot::looping(demo_course());
    let follower = LineFollower::new(robot, time, config.follower);

    let commands = CommandChannel::connect(&config.server_host, config.command_port)?;
    let telemetry = TelemetryChannel::new(
        UdpDatagramTransport::bind(&config.telemetry_addr())?,
        &config.robot_id,
        config.telemetry_hz,
    );
    log_info!("Telemetry to {} at {} Hz", config.telemetry_addr(), config.telemetry_hz);

    let mut control = ControlLoop::new(
        follower,
        commands,
        telemetry,
        time,
        RobotPose::from_config(&config),
        Duration::from_millis(config.cycle_ms),
    );
    control.run(|control| control.commands().is_connected());

    log_warn!("Command connection lost, shutting down");
    Ok(())
}

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("tracing subscriber not installed: {}", err);
    }

    if let Err(err) = run() {
        log_error!("{}", err);
        std::process::exit(1);
    }
}
