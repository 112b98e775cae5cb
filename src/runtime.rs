//! Cooperative control loop
//!
//! One execution context runs every cycle in this order:
//!
//! 1. Path follower update (fresh sensor snapshot, drive command)
//! 2. Command channel poll, at most one command
//! 3. Telemetry, when its stream rate allows
//!
//! The follower never blocks, so command intake and telemetry keep running
//! through turn maneuvers.

use std::time::Duration;

use line_rover_core::protocol::Response;
use line_rover_core::traits::{Actuation, LineSensor, TimeSource};

use crate::communication::transport::{DatagramTransport, LineTransport};
use crate::communication::{CommandChannel, CommandExtensions, TelemetryChannel};
use crate::config::RobotConfig;
use crate::rover::LineFollower;

/// Position and battery figures reported in telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotPose {
    pub pos_x: i32,
    pub pos_y: i32,
    pub battery: u8,
}

impl RobotPose {
    pub fn from_config(config: &RobotConfig) -> Self {
        Self {
            pos_x: config.pos_x,
            pos_y: config.pos_y,
            battery: config.battery,
        }
    }
}

/// What happened during one cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Response to the command handled this cycle, if any
    pub response: Option<Response>,
    /// True if a telemetry report was sent
    pub telemetry_sent: bool,
}

/// Follower, command channel and telemetry driven from one loop
pub struct ControlLoop<H, T, S, D, E>
where
    H: Actuation + LineSensor,
    T: TimeSource,
    S: LineTransport,
    D: DatagramTransport,
    E: CommandExtensions,
{
    follower: LineFollower<H, T>,
    commands: CommandChannel<S, E>,
    telemetry: TelemetryChannel<D>,
    time: T,
    pose: RobotPose,
    cycle: Duration,
    cycles: u64,
}

impl<H, T, S, D, E> ControlLoop<H, T, S, D, E>
where
    H: Actuation + LineSensor,
    T: TimeSource,
    S: LineTransport,
    D: DatagramTransport,
    E: CommandExtensions,
{
    pub fn new(
        follower: LineFollower<H, T>,
        commands: CommandChannel<S, E>,
        telemetry: TelemetryChannel<D>,
        time: T,
        pose: RobotPose,
        cycle: Duration,
    ) -> Self {
        Self {
            follower,
            commands,
            telemetry,
            time,
            pose,
            cycle,
            cycles: 0,
        }
    }

    /// Run one cycle without sleeping
    pub fn run_cycle(&mut self) -> CycleReport {
        self.follower.update();
        let response = self.commands.poll_and_dispatch(&mut self.follower);
        let telemetry_sent = self.telemetry.maybe_broadcast(
            self.time.now_us(),
            &self.follower,
            self.pose.pos_x,
            self.pose.pos_y,
            self.pose.battery,
        );
        self.cycles += 1;

        CycleReport {
            response,
            telemetry_sent,
        }
    }

    /// Run cycles at the configured period until `keep_running` returns
    /// false
    ///
    /// `keep_running` is checked before every cycle.
    pub fn run<F>(&mut self, mut keep_running: F)
    where
        F: FnMut(&Self) -> bool,
    {
        crate::log_info!("Control loop running, cycle {:?}", self.cycle);
        while keep_running(self) {
            let started_us = self.time.now_us();
            self.run_cycle();

            let spent = Duration::from_micros(self.time.now_us().saturating_sub(started_us));
            if let Some(remaining) = self.cycle.checked_sub(spent) {
                std::thread::sleep(remaining);
            }
        }
        crate::log_info!("Control loop stopped after {} cycles", self.cycles);
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn pose(&self) -> RobotPose {
        self.pose
    }

    pub fn set_pose(&mut self, pose: RobotPose) {
        self.pose = pose;
    }

    pub fn follower(&self) -> &LineFollower<H, T> {
        &self.follower
    }

    pub fn follower_mut(&mut self) -> &mut LineFollower<H, T> {
        &mut self.follower
    }

    pub fn commands(&self) -> &CommandChannel<S, E> {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandChannel<S, E> {
        &mut self.commands
    }

    pub fn telemetry(&self) -> &TelemetryChannel<D> {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut TelemetryChannel<D> {
        &mut self.telemetry
    }
}
