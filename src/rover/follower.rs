//! Path follower
//!
//! Turns one sensor snapshot per cycle into a drive command and walks the
//! installed path one operator per intersection.
//!
//! ## Behavior
//!
//! - Not running: motors halted, state `Idle`
//! - No intersection: line-centering picks Forward, a soft or hard
//!   correction, or halts with `LineLost`
//! - Intersection: halt and settle, label the node, then consume the next
//!   operator:
//!   - Left/Right: clear forward, pivot, then wait for the line
//!   - U-turn: clear forward, spin, then wait through three stages
//!     (first crossing, all clear, line acquired)
//!   - Straight: drive forward for a fixed interval
//!   - Unknown: warn and resume tracking; the step still advances
//!   - End, or path exhausted: `Arrived`, stop running
//!
//! ## Timing
//!
//! Every interval is a phase measured against the [`TimeSource`]; nothing
//! blocks. `update()` returns as soon as the current phase has to wait, so
//! the control loop keeps polling commands and sending telemetry during a
//! maneuver, and [`LineFollower::stop`] takes effect at any time.
//!
//! Each snapshot drives at most one intersection decision, and the line
//! re-acquisition check starts with the snapshot after the pivot finishes.

use line_rover_core::follower::{FollowerState, FollowerStatus, NodeLabel};
use line_rover_core::motor::MotorError;
use line_rover_core::parameters::FollowerParams;
use line_rover_core::path::{ParseReport, Path, PathOp};
use line_rover_core::sensors::{Correction, SensorSnapshot};
use line_rover_core::traits::{Actuation, LineSensor, TimeSource};

/// Turn maneuver that ends with a line re-acquisition wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Left,
    Right,
    UTurn,
}

impl Turn {
    fn state(self) -> FollowerState {
        match self {
            Turn::Left => FollowerState::ExecutingLeft,
            Turn::Right => FollowerState::ExecutingRight,
            Turn::UTurn => FollowerState::ExecutingUTurn,
        }
    }

    fn first_stage(self) -> Reacquire {
        match self {
            Turn::Left | Turn::Right => Reacquire::Line,
            Turn::UTurn => Reacquire::Crossing,
        }
    }
}

/// Re-acquisition stage
///
/// Left and right turns only wait for `Line`. A U-turn sweeps across the
/// line it came in on first, so it waits for that crossing, then for the
/// bar to clear it, then for the real line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reacquire {
    Crossing,
    ClearOfCrossing,
    Line,
}

/// Maneuver phase; `since_ms` is when the phase began
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tracking,
    Settling { since_ms: u64 },
    Clearing { turn: Turn, since_ms: u64 },
    Pivoting { turn: Turn, since_ms: u64 },
    Reacquiring { turn: Turn, stage: Reacquire, since_ms: u64 },
    Passing { since_ms: u64 },
}

/// Whether `update()` should evaluate the next phase with the same snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Yield,
}

/// Line-following state machine over an injected drive, sensor bar and
/// clock
pub struct LineFollower<H, T>
where
    H: Actuation + LineSensor,
    T: TimeSource,
{
    hardware: H,
    time: T,
    params: FollowerParams,
    path: Path,
    step: usize,
    running: bool,
    state: FollowerState,
    node: NodeLabel,
    sensors: SensorSnapshot,
    phase: Phase,
    line_lost_logged: bool,
}

impl<H, T> LineFollower<H, T>
where
    H: Actuation + LineSensor,
    T: TimeSource,
{
    /// Create an idle follower with no path
    pub fn new(hardware: H, time: T, params: FollowerParams) -> Self {
        Self {
            hardware,
            time,
            params,
            path: Path::new(),
            step: 0,
            running: false,
            state: FollowerState::Idle,
            node: NodeLabel::none(),
            sensors: SensorSnapshot::default(),
            phase: Phase::Tracking,
            line_lost_logged: false,
        }
    }

    /// Replace the active path and reset progress; does not start motion
    ///
    /// Characters that are not operator digits keep their slot and are
    /// passed over at their intersection. Operators past the path capacity
    /// are dropped.
    pub fn set_path(&mut self, code: &str) -> ParseReport {
        let (path, report) = Path::parse(code);
        if report.unknown > 0 {
            crate::log_warn!(
                "Path {:?}: {} unknown operators will be skipped",
                code,
                report.unknown
            );
        }
        if report.truncated > 0 {
            crate::log_warn!(
                "Path {:?}: dropped {} operators past capacity",
                code,
                report.truncated
            );
        }
        crate::log_info!("Path set: {} operators", path.len());

        self.path = path;
        self.step = 0;
        report
    }

    /// Begin following the installed path
    ///
    /// Returns `false` and leaves the state untouched if no path is set.
    pub fn start(&mut self) -> bool {
        if self.path.is_empty() {
            crate::log_warn!("Start ignored: no path set");
            return false;
        }

        self.running = true;
        self.step = 0;
        self.state = FollowerState::Forward;
        self.node = NodeLabel::start();
        self.phase = Phase::Tracking;
        self.line_lost_logged = false;
        crate::log_info!("Path following started");
        true
    }

    /// Halt immediately, abandoning any maneuver in progress
    pub fn stop(&mut self) {
        self.running = false;
        self.state = FollowerState::Idle;
        self.phase = Phase::Tracking;
        self.halt();
        crate::log_info!("Path following stopped");
    }

    /// Run one control cycle against a fresh sensor snapshot
    pub fn update(&mut self) {
        let snapshot = self.hardware.read_five_channels();
        self.sensors = snapshot;

        if !self.running {
            self.state = FollowerState::Idle;
            self.phase = Phase::Tracking;
            self.halt();
            return;
        }

        let now_ms = self.time.now_ms();
        let mut intersection_checked = false;

        while self.running {
            let flow = match self.phase {
                Phase::Tracking => {
                    if intersection_checked {
                        Flow::Yield
                    } else {
                        intersection_checked = true;
                        self.track(snapshot, now_ms)
                    }
                }
                Phase::Settling { since_ms } => {
                    if self.waiting(since_ms, self.params.settle_ms, now_ms) {
                        Flow::Yield
                    } else {
                        self.execute_next_operator(now_ms)
                    }
                }
                Phase::Clearing { turn, since_ms } => {
                    if self.waiting(since_ms, self.params.clear_ms, now_ms) {
                        Flow::Yield
                    } else {
                        self.pivot(turn, now_ms)
                    }
                }
                Phase::Pivoting { turn, since_ms } => {
                    if self.waiting(since_ms, self.params.pivot_ms, now_ms) {
                        Flow::Yield
                    } else {
                        self.phase = Phase::Reacquiring {
                            turn,
                            stage: turn.first_stage(),
                            since_ms: now_ms,
                        };
                        Flow::Yield
                    }
                }
                Phase::Reacquiring {
                    turn,
                    stage,
                    since_ms,
                } => self.reacquire(turn, stage, since_ms, snapshot, now_ms),
                Phase::Passing { since_ms } => {
                    if self.waiting(since_ms, self.params.straight_ms, now_ms) {
                        Flow::Yield
                    } else {
                        self.phase = Phase::Tracking;
                        Flow::Continue
                    }
                }
            };

            if flow == Flow::Yield {
                break;
            }
        }
    }

    pub fn state(&self) -> FollowerState {
        self.state
    }

    /// Label of the most recent intersection, or "start"/"arrived"
    pub fn current_node(&self) -> &str {
        self.node.as_str()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Index of the next operator to execute
    pub fn current_step(&self) -> usize {
        self.step
    }

    /// Snapshot captured by the last `update()`
    pub fn sensor_values(&self) -> SensorSnapshot {
        self.sensors
    }

    /// Everything telemetry reports, captured at once
    pub fn status(&self) -> FollowerStatus {
        FollowerStatus {
            state: self.state,
            node: self.node.clone(),
            running: self.running,
            step: self.step,
            sensors: self.sensors,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn params(&self) -> &FollowerParams {
        &self.params
    }

    /// Replace the timing parameters; a maneuver in progress picks up the
    /// new values at its next check
    pub fn set_params(&mut self, params: FollowerParams) {
        self.params = params;
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// True while a maneuver phase is still inside its interval
    fn waiting(&self, since_ms: u64, duration_ms: u32, now_ms: u64) -> bool {
        now_ms.saturating_sub(since_ms) < u64::from(duration_ms)
    }

    fn track(&mut self, snapshot: SensorSnapshot, now_ms: u64) -> Flow {
        if snapshot.is_intersection() {
            self.halt();
            self.state = FollowerState::IntersectionDetected;
            self.node = NodeLabel::intersection(self.step);
            self.line_lost_logged = false;
            crate::log_info!("Intersection {} detected", self.node.as_str());
            self.phase = Phase::Settling { since_ms: now_ms };
            return Flow::Continue;
        }

        self.follow_line(snapshot);
        Flow::Yield
    }

    fn follow_line(&mut self, snapshot: SensorSnapshot) {
        let correction = snapshot.correction();
        if correction != Correction::Lost {
            self.line_lost_logged = false;
        }

        match correction {
            Correction::Straight => {
                self.state = FollowerState::Forward;
                self.actuate(H::drive_forward);
            }
            Correction::SoftLeft => {
                self.state = FollowerState::SoftLeft;
                self.actuate(H::turn_left_soft);
            }
            Correction::SoftRight => {
                self.state = FollowerState::SoftRight;
                self.actuate(H::turn_right_soft);
            }
            Correction::HardLeft => {
                self.state = FollowerState::HardLeft;
                self.actuate(H::pivot_left);
            }
            Correction::HardRight => {
                self.state = FollowerState::HardRight;
                self.actuate(H::pivot_right);
            }
            Correction::Lost => {
                self.state = FollowerState::LineLost;
                self.halt();
                if !self.line_lost_logged {
                    self.line_lost_logged = true;
                    crate::log_warn!(
                        "Line lost at step {} (sensors {:?})",
                        self.step,
                        snapshot.levels()
                    );
                }
            }
        }
    }

    /// Consume the operator at the current step
    fn execute_next_operator(&mut self, now_ms: u64) -> Flow {
        let op = match self.path.get(self.step) {
            Some(op) => op,
            None => {
                self.arrive("path exhausted");
                return Flow::Yield;
            }
        };

        crate::log_info!(
            "Executing {} at {} (step {})",
            op.name(),
            self.node.as_str(),
            self.step
        );
        self.step += 1;

        match op {
            PathOp::End => {
                self.arrive("end operator");
                Flow::Yield
            }
            PathOp::Left => self.begin_turn(Turn::Left, now_ms),
            PathOp::Right => self.begin_turn(Turn::Right, now_ms),
            PathOp::UTurn => self.begin_turn(Turn::UTurn, now_ms),
            PathOp::Straight => {
                self.state = FollowerState::PassingStraight;
                self.actuate(H::drive_forward);
                self.phase = Phase::Passing { since_ms: now_ms };
                Flow::Continue
            }
            PathOp::Unknown(c) => {
                crate::log_warn!("Unknown operator {:?} at {}, skipped", c, self.node.as_str());
                self.phase = Phase::Tracking;
                Flow::Continue
            }
        }
    }

    fn begin_turn(&mut self, turn: Turn, now_ms: u64) -> Flow {
        self.state = turn.state();
        self.actuate(H::drive_forward);
        self.phase = Phase::Clearing {
            turn,
            since_ms: now_ms,
        };
        Flow::Continue
    }

    fn pivot(&mut self, turn: Turn, now_ms: u64) -> Flow {
        match turn {
            Turn::Left => self.actuate(H::pivot_left),
            Turn::Right => self.actuate(H::pivot_right),
            Turn::UTurn => self.actuate(H::pivot_uturn_right),
        }
        self.phase = Phase::Pivoting {
            turn,
            since_ms: now_ms,
        };
        Flow::Continue
    }

    fn reacquire(
        &mut self,
        turn: Turn,
        stage: Reacquire,
        since_ms: u64,
        snapshot: SensorSnapshot,
        now_ms: u64,
    ) -> Flow {
        if self.params.has_reacquire_timeout()
            && !self.waiting(since_ms, self.params.reacquire_timeout_ms, now_ms)
        {
            crate::log_error!(
                "Line not re-acquired within {} ms after {:?}, stopping",
                self.params.reacquire_timeout_ms,
                turn
            );
            self.running = false;
            self.state = FollowerState::LineLost;
            self.phase = Phase::Tracking;
            self.halt();
            return Flow::Yield;
        }

        let next = match stage {
            Reacquire::Crossing if snapshot.is_line_crossing() => Some(Reacquire::ClearOfCrossing),
            Reacquire::ClearOfCrossing if snapshot.is_all_clear() => Some(Reacquire::Line),
            Reacquire::Line if snapshot.is_line_acquired() => None,
            _ => {
                return Flow::Yield;
            }
        };

        match next {
            Some(stage) => {
                crate::log_debug!("{:?} re-acquisition stage {:?}", turn, stage);
                self.phase = Phase::Reacquiring {
                    turn,
                    stage,
                    since_ms,
                };
                Flow::Yield
            }
            None => {
                crate::log_info!("Line re-acquired after {:?}", turn);
                self.phase = Phase::Tracking;
                Flow::Continue
            }
        }
    }

    fn arrive(&mut self, reason: &str) {
        self.running = false;
        self.state = FollowerState::Arrived;
        self.node = NodeLabel::arrived();
        self.phase = Phase::Tracking;
        self.halt();
        crate::log_info!("Arrived ({})", reason);
    }

    fn halt(&mut self) {
        self.actuate(H::halt);
    }

    fn actuate(&mut self, action: fn(&mut H) -> Result<(), MotorError>) {
        if let Err(err) = action(&mut self.hardware) {
            crate::log_error!("Drive command failed: {}", err);
        }
    }
}
