//! Command dispatcher
//!
//! Routes one decoded command line to its handler and produces exactly one
//! [`Response`].
//!
//! # Routing
//!
//! | Command                | Handler                                   |
//! |------------------------|-------------------------------------------|
//! | `MOVE` + `path`        | install path on the follower and start it |
//! | `MOVE` + `target_node` | [`CommandExtensions::move_to_node`]       |
//! | `TASK`                 | [`CommandExtensions::run_task`]           |
//! | `MANUAL`               | [`CommandExtensions::set_device`]         |
//!
//! Decode failures, missing fields and unknown commands are answered with
//! FAIL and never reach a handler.

use line_rover_core::path::MAX_PATH_LEN;
use line_rover_core::protocol::{Command, DeviceState, Outcome, Response};
use line_rover_core::traits::{Actuation, LineSensor, TimeSource};

use super::codec;
use crate::rover::LineFollower;

/// Handlers for commands the robot accepts but does not execute itself
///
/// Node navigation, actuator tasks and auxiliary devices are integration
/// points. The default methods acknowledge receipt without acting.
pub trait CommandExtensions {
    /// Navigate to a node by id
    fn move_to_node(&mut self, target_node: &str) -> Response {
        crate::log_info!("Move to node {} acknowledged, not executed", target_node);
        Response::success("move to node acknowledged")
    }

    /// Run actuator task `action` `count` times
    fn run_task(&mut self, action: &str, count: u32) -> Response {
        crate::log_info!("Task {} x{} acknowledged, not executed", action, count);
        Response::success("task acknowledged")
    }

    /// Switch an auxiliary device on or off
    fn set_device(&mut self, device: &str, state: DeviceState) -> Response {
        crate::log_info!(
            "Manual {} {} acknowledged, not executed",
            device,
            state.as_str()
        );
        Response::success("manual control acknowledged")
    }
}

/// Extensions that acknowledge every request and do nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct AcknowledgeOnly;

impl CommandExtensions for AcknowledgeOnly {}

/// Per-outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub succeeded: u32,
    pub failed: u32,
}

/// Routes command lines to the follower and the extension handlers
pub struct CommandDispatcher<E = AcknowledgeOnly> {
    extensions: E,
    stats: DispatchStats,
}

impl CommandDispatcher<AcknowledgeOnly> {
    pub fn acknowledge_only() -> Self {
        Self::new(AcknowledgeOnly)
    }
}

impl Default for CommandDispatcher<AcknowledgeOnly> {
    fn default() -> Self {
        Self::acknowledge_only()
    }
}

impl<E: CommandExtensions> CommandDispatcher<E> {
    pub fn new(extensions: E) -> Self {
        Self {
            extensions,
            stats: DispatchStats::default(),
        }
    }

    /// Decode and handle one line
    ///
    /// Returns `None` for a blank line, which gets no response.
    pub fn handle_line<H, T>(
        &mut self,
        line: &str,
        follower: &mut LineFollower<H, T>,
    ) -> Option<Response>
    where
        H: Actuation + LineSensor,
        T: TimeSource,
    {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        crate::log_debug!("Received: {}", line);

        let response = match codec::decode_command(line) {
            Ok(raw) => match Command::try_from(raw) {
                Ok(command) => self.dispatch(command, follower),
                Err(err) => {
                    crate::log_warn!("Rejected command: {}", err);
                    Response::formatted(Outcome::Fail, format_args!("{}", err))
                }
            },
            Err(err) => {
                crate::log_warn!("JSON parse error: {}", err);
                Self::parse_error(&err)
            }
        };

        Some(self.record(response))
    }

    /// Answer for a line that overflowed the receive buffer
    pub fn handle_oversized(&mut self, len: usize) -> Response {
        crate::log_warn!("Discarded {} byte line", len);
        self.record(Response::formatted(
            Outcome::Fail,
            format_args!("json parse error: line of {} bytes too long", len),
        ))
    }

    /// Route a validated command
    pub fn dispatch<H, T>(&mut self, command: Command, follower: &mut LineFollower<H, T>) -> Response
    where
        H: Actuation + LineSensor,
        T: TimeSource,
    {
        match command {
            Command::MoveByPath { path } => {
                crate::log_info!("MOVE path {}", path);
                let len = path.chars().count();
                if len > MAX_PATH_LEN {
                    crate::log_warn!("Path of {} or more operators rejected", len);
                    return Response::formatted(
                        Outcome::Fail,
                        format_args!("path too long, max {} operators", MAX_PATH_LEN),
                    );
                }
                follower.set_path(&path);
                if follower.start() {
                    Response::success("path following started")
                } else {
                    Response::success("path accepted, no operators to follow")
                }
            }
            Command::MoveToNode { target_node } => self.extensions.move_to_node(&target_node),
            Command::Task { action, count } => self.extensions.run_task(&action, count),
            Command::Manual { device, state } => self.extensions.set_device(&device, state),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn extensions(&self) -> &E {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut E {
        &mut self.extensions
    }

    fn parse_error(err: &serde_json::Error) -> Response {
        Response::formatted(Outcome::Fail, format_args!("json parse error: {}", err))
    }

    fn record(&mut self, response: Response) -> Response {
        match response.status {
            Outcome::Success => self.stats.succeeded += 1,
            Outcome::Fail => self.stats.failed += 1,
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SimulatedRobot;
    use line_rover_core::follower::FollowerState;
    use line_rover_core::parameters::FollowerParams;
    use line_rover_core::traits::MockTime;

    /// Extension handler that records what it was asked to do
    #[derive(Default)]
    struct Recording {
        calls: Vec<String>,
    }

    impl CommandExtensions for Recording {
        fn move_to_node(&mut self, target_node: &str) -> Response {
            self.calls.push(format!("node {}", target_node));
            Response::success("navigating")
        }

        fn run_task(&mut self, action: &str, count: u32) -> Response {
            self.calls.push(format!("task {} {}", action, count));
            Response::success("task done")
        }

        fn set_device(&mut self, device: &str, state: DeviceState) -> Response {
            self.calls.push(format!("device {} {}", device, state.as_str()));
            Response::fail("no such device")
        }
    }

    fn follower(time: &MockTime) -> LineFollower<SimulatedRobot, &MockTime> {
        LineFollower::new(SimulatedRobot::new(), time, FollowerParams::immediate())
    }

    #[test]
    fn test_move_path_starts_follower() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        let response = dispatcher
            .handle_line(r#"{"cmd":"MOVE","path":"4"}"#, &mut f)
            .unwrap();
        assert_eq!(response, Response::success("path following started"));
        assert!(f.is_running());
        assert_eq!(f.state(), FollowerState::Forward);
        assert_eq!(dispatcher.stats().succeeded, 1);
    }

    #[test]
    fn test_move_without_fields_fails() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        let response = dispatcher.handle_line(r#"{"cmd":"MOVE"}"#, &mut f).unwrap();
        assert_eq!(response, Response::fail("missing path or target field"));
        assert!(!f.is_running());
    }

    #[test]
    fn test_move_replaces_running_path() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        dispatcher.handle_line(r#"{"cmd":"MOVE","path":"11"}"#, &mut f);
        dispatcher.handle_line(r#"{"cmd":"MOVE","path":"435"}"#, &mut f);
        assert_eq!(f.path().len(), 3);
        assert_eq!(f.current_step(), 0);
    }

    #[test]
    fn test_move_with_overlong_path_fails() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();
        dispatcher.handle_line(r#"{"cmd":"MOVE","path":"12"}"#, &mut f);

        let line = format!(r#"{{"cmd":"MOVE","path":"{}"}}"#, "4".repeat(100));
        let response = dispatcher.handle_line(&line, &mut f).unwrap();
        assert_eq!(response.status, Outcome::Fail);
        assert!(response.msg.starts_with("path too long"));

        // the previous route is left in place
        assert_eq!(f.path().len(), 2);
        assert_eq!(dispatcher.stats().failed, 1);
    }

    #[test]
    fn test_move_with_full_length_path_starts() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        let line = format!(r#"{{"cmd":"MOVE","path":"{}"}}"#, "4".repeat(MAX_PATH_LEN));
        let response = dispatcher.handle_line(&line, &mut f).unwrap();
        assert!(response.is_success());
        assert_eq!(f.path().len(), MAX_PATH_LEN);
    }

    #[test]
    fn test_move_with_empty_path_does_not_start() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        let response = dispatcher
            .handle_line(r#"{"cmd":"MOVE","path":""}"#, &mut f)
            .unwrap();
        assert!(response.is_success());
        assert!(!f.is_running());
        assert_eq!(f.state(), FollowerState::Idle);
    }

    #[test]
    fn test_malformed_line_never_reaches_handlers() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::new(Recording::default());

        let response = dispatcher
            .handle_line(r#"{"cmd":"TASK","action":"#, &mut f)
            .unwrap();
        assert_eq!(response.status, Outcome::Fail);
        assert!(response.msg.starts_with("json parse error"));
        assert!(dispatcher.extensions().calls.is_empty());
        assert!(!f.is_running());
        assert_eq!(dispatcher.stats().failed, 1);
    }

    #[test]
    fn test_unknown_command() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        let response = dispatcher
            .handle_line(r#"{"cmd":"DANCE"}"#, &mut f)
            .unwrap();
        assert_eq!(response, Response::fail("unknown command: DANCE"));
    }

    #[test]
    fn test_missing_cmd() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        let response = dispatcher.handle_line(r#"{"path":"1"}"#, &mut f).unwrap();
        assert_eq!(response, Response::fail("missing cmd field"));
        assert!(!f.is_running());
    }

    #[test]
    fn test_blank_line_gets_no_response() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        assert!(dispatcher.handle_line("   ", &mut f).is_none());
        assert_eq!(dispatcher.stats(), DispatchStats::default());
    }

    #[test]
    fn test_default_extensions_acknowledge() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::acknowledge_only();

        let lines = [
            r#"{"cmd":"MOVE","target_node":"NODE-A1-001"}"#,
            r#"{"cmd":"TASK","action":"PICK_AND_PLACE","count":5}"#,
            r#"{"cmd":"MANUAL","device":"FAN","state":"ON"}"#,
        ];
        for line in lines {
            let response = dispatcher.handle_line(line, &mut f).unwrap();
            assert!(response.is_success(), "{}", line);
        }
        assert!(!f.is_running());
        assert_eq!(dispatcher.stats().succeeded, 3);
    }

    #[test]
    fn test_extensions_receive_payloads() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::new(Recording::default());

        dispatcher.handle_line(r#"{"cmd":"MOVE","target_node":"N7"}"#, &mut f);
        dispatcher.handle_line(r#"{"cmd":"TASK","action":"PICK"}"#, &mut f);
        let response = dispatcher
            .handle_line(r#"{"cmd":"MANUAL","device":"FAN","state":"off"}"#, &mut f)
            .unwrap();

        assert_eq!(response, Response::fail("no such device"));
        assert_eq!(
            dispatcher.extensions().calls,
            vec!["node N7", "task PICK 1", "device FAN OFF"]
        );
    }

    #[test]
    fn test_long_fields_reach_their_handlers() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::new(Recording::default());

        let response = dispatcher
            .handle_line(
                r#"{"cmd":"MOVE","target_node":"NODE-WAREHOUSE-SECTION-A1-SHELF-0001"}"#,
                &mut f,
            )
            .unwrap();
        assert!(response.is_success());
        assert_eq!(
            dispatcher.extensions().calls,
            vec!["node NODE-WAREHOUSE-SECTION-A1-SHELF-0001"]
        );

        let line = format!(r#"{{"cmd":"{}"}}"#, "X".repeat(200));
        let response = dispatcher.handle_line(&line, &mut f).unwrap();
        assert_eq!(response.status, Outcome::Fail);
        assert!(response.msg.starts_with("unknown command: XXX"));
    }

    #[test]
    fn test_bad_count_defaults_to_one() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::new(Recording::default());

        for line in [
            r#"{"cmd":"TASK","action":"PICK","count":"two"}"#,
            r#"{"cmd":"TASK","action":"PICK","count":-1}"#,
        ] {
            let response = dispatcher.handle_line(line, &mut f).unwrap();
            assert!(response.is_success(), "{}", line);
        }
        assert_eq!(dispatcher.extensions().calls, vec!["task PICK 1", "task PICK 1"]);
    }

    #[test]
    fn test_task_without_action() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut dispatcher = CommandDispatcher::new(Recording::default());

        let response = dispatcher
            .handle_line(r#"{"cmd":"TASK","count":2}"#, &mut f)
            .unwrap();
        assert_eq!(response, Response::fail("missing action field"));
        assert!(dispatcher.extensions().calls.is_empty());
    }

    #[test]
    fn test_oversized_line() {
        let mut dispatcher = CommandDispatcher::acknowledge_only();
        let response = dispatcher.handle_oversized(2048);
        assert_eq!(response.status, Outcome::Fail);
        assert!(response.msg.contains("2048"));
    }
}
