//! Simulated robot backend
//!
//! Stands in for the motor driver and IR sensor bar. Sensor readings come
//! from a script of snapshots; the most recent drive commands are recorded
//! so tests can check what the follower asked for.

use std::collections::VecDeque;

use line_rover_core::motor::MotorError;
use line_rover_core::sensors::SensorSnapshot;
use line_rover_core::traits::{Actuation, LineSensor};

/// Drive commands kept in the history; older ones are discarded
pub const ACTION_HISTORY: usize = 256;

/// Drive primitive issued through [`Actuation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveAction {
    Forward,
    PivotLeft,
    PivotRight,
    UTurnRight,
    SoftLeft,
    SoftRight,
    Halt,
}

/// Where readings come from once the queued script runs out
#[derive(Debug, Clone)]
enum Feed {
    /// Repeat the last reading
    Hold,
    /// Replay a fixed course forever
    Looping { course: Vec<SensorSnapshot>, next: usize },
}

/// Scripted sensor bar with a recording drive
#[derive(Debug, Clone)]
pub struct SimulatedRobot {
    queued: VecDeque<SensorSnapshot>,
    feed: Feed,
    last_reading: SensorSnapshot,
    actions: Vec<DriveAction>,
    issued: usize,
    reads: usize,
    fault: Option<MotorError>,
}

impl SimulatedRobot {
    /// Robot with every sensor off the line
    pub fn new() -> Self {
        Self {
            queued: VecDeque::new(),
            feed: Feed::Hold,
            last_reading: SensorSnapshot::default(),
            actions: Vec::with_capacity(ACTION_HISTORY),
            issued: 0,
            reads: 0,
            fault: None,
        }
    }

    /// Robot that reads `script` in order, then holds the last reading
    pub fn with_script<I>(script: I) -> Self
    where
        I: IntoIterator<Item = SensorSnapshot>,
    {
        let mut robot = Self::new();
        robot.queued.extend(script);
        robot
    }

    /// Robot that replays `course` forever
    ///
    /// An empty course behaves like [`new`](Self::new).
    pub fn looping(course: Vec<SensorSnapshot>) -> Self {
        let mut robot = Self::new();
        if !course.is_empty() {
            robot.feed = Feed::Looping { course, next: 0 };
        }
        robot
    }

    /// Queue one more reading
    pub fn push(&mut self, snapshot: SensorSnapshot) {
        self.queued.push_back(snapshot);
    }

    /// Queue the same reading `times` times
    pub fn push_repeated(&mut self, snapshot: SensorSnapshot, times: usize) {
        self.queued
            .extend(std::iter::repeat(snapshot).take(times));
    }

    /// Number of readings still queued
    pub fn pending(&self) -> usize {
        self.queued.len()
    }

    /// Total sensor reads so far
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Up to the last [`ACTION_HISTORY`] drive commands in issue order
    pub fn actions(&self) -> &[DriveAction] {
        &self.actions
    }

    /// Most recent drive command
    pub fn last_action(&self) -> Option<DriveAction> {
        self.actions.last().copied()
    }

    /// Drive commands accepted since creation, including discarded ones
    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn clear_actions(&mut self) {
        self.actions.clear();
    }

    /// Make every following drive command fail with `fault`
    ///
    /// `None` clears the fault.
    pub fn set_fault(&mut self, fault: Option<MotorError>) {
        self.fault = fault;
    }

    fn record(&mut self, action: DriveAction) -> Result<(), MotorError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if self.actions.len() == ACTION_HISTORY {
            self.actions.remove(0);
        }
        self.actions.push(action);
        self.issued += 1;
        Ok(())
    }
}

impl Default for SimulatedRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSensor for SimulatedRobot {
    fn read_five_channels(&mut self) -> SensorSnapshot {
        self.reads += 1;
        let reading = match self.queued.pop_front() {
            Some(snapshot) => snapshot,
            None => match &mut self.feed {
                Feed::Hold => self.last_reading,
                Feed::Looping { course, next } => {
                    let snapshot = course[*next];
                    *next = (*next + 1) % course.len();
                    snapshot
                }
            },
        };
        self.last_reading = reading;
        reading
    }
}

impl Actuation for SimulatedRobot {
    fn drive_forward(&mut self) -> Result<(), MotorError> {
        self.record(DriveAction::Forward)
    }

    fn pivot_left(&mut self) -> Result<(), MotorError> {
        self.record(DriveAction::PivotLeft)
    }

    fn pivot_right(&mut self) -> Result<(), MotorError> {
        self.record(DriveAction::PivotRight)
    }

    fn pivot_uturn_right(&mut self) -> Result<(), MotorError> {
        self.record(DriveAction::UTurnRight)
    }

    fn turn_left_soft(&mut self) -> Result<(), MotorError> {
        self.record(DriveAction::SoftLeft)
    }

    fn turn_right_soft(&mut self) -> Result<(), MotorError> {
        self.record(DriveAction::SoftRight)
    }

    fn halt(&mut self) -> Result<(), MotorError> {
        self.record(DriveAction::Halt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(bits: u8) -> SensorSnapshot {
        SensorSnapshot::from_bits(bits)
    }

    #[test]
    fn test_script_then_hold() {
        let mut robot = SimulatedRobot::with_script([snap(0b00100), snap(0b11111)]);
        assert_eq!(robot.read_five_channels(), snap(0b00100));
        assert_eq!(robot.read_five_channels(), snap(0b11111));
        assert_eq!(robot.read_five_channels(), snap(0b11111));
        assert_eq!(robot.reads(), 3);
        assert_eq!(robot.pending(), 0);
    }

    #[test]
    fn test_new_reads_all_clear() {
        let mut robot = SimulatedRobot::new();
        assert!(robot.read_five_channels().is_all_clear());
    }

    #[test]
    fn test_looping_course() {
        let mut robot = SimulatedRobot::looping(vec![snap(0b00100), snap(0b01100)]);
        robot.push(snap(0b11111));
        assert_eq!(robot.read_five_channels(), snap(0b11111));
        assert_eq!(robot.read_five_channels(), snap(0b00100));
        assert_eq!(robot.read_five_channels(), snap(0b01100));
        assert_eq!(robot.read_five_channels(), snap(0b00100));
    }

    #[test]
    fn test_records_actions() {
        let mut robot = SimulatedRobot::new();
        robot.drive_forward().unwrap();
        robot.pivot_uturn_right().unwrap();
        robot.halt().unwrap();
        assert_eq!(
            robot.actions(),
            &[DriveAction::Forward, DriveAction::UTurnRight, DriveAction::Halt]
        );
        assert_eq!(robot.last_action(), Some(DriveAction::Halt));
    }

    #[test]
    fn test_action_history_is_bounded() {
        let mut robot = SimulatedRobot::looping(vec![snap(0b00100)]);
        for _ in 0..ACTION_HISTORY * 3 {
            robot.drive_forward().unwrap();
        }
        robot.halt().unwrap();

        assert_eq!(robot.actions().len(), ACTION_HISTORY);
        assert_eq!(robot.issued(), ACTION_HISTORY * 3 + 1);
        assert_eq!(robot.last_action(), Some(DriveAction::Halt));
        assert_eq!(robot.actions()[0], DriveAction::Forward);
    }

    #[test]
    fn test_fault_injection() {
        let mut robot = SimulatedRobot::new();
        robot.set_fault(Some(MotorError::HardwareFault));
        assert_eq!(robot.drive_forward(), Err(MotorError::HardwareFault));
        assert!(robot.actions().is_empty());

        robot.set_fault(None);
        assert!(robot.halt().is_ok());
    }
}
