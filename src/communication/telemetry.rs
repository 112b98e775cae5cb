//! Telemetry channel
//!
//! Packages robot identity, pose, battery and follower status into a
//! `ROBOT_STATE` datagram. Sends are fire-and-forget: a failed send is
//! logged at debug level and otherwise invisible to the caller.

use line_rover_core::protocol::RobotStateReport;
use line_rover_core::traits::{Actuation, LineSensor, TimeSource};

use super::codec;
use super::transport::DatagramTransport;
use crate::rover::LineFollower;

/// Rate limiter for a periodic stream
#[derive(Debug, Clone, Copy)]
pub struct StreamRate {
    /// Target rate in Hz (0 = disabled)
    rate_hz: u32,
    /// Last send timestamp in microseconds
    last_send_us: Option<u64>,
}

impl StreamRate {
    pub const fn new(rate_hz: u32) -> Self {
        Self {
            rate_hz,
            last_send_us: None,
        }
    }

    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// True if a full interval has elapsed since the last send
    ///
    /// Always true before the first send; never true when disabled.
    pub fn should_send(&self, now_us: u64) -> bool {
        if self.rate_hz == 0 {
            return false;
        }

        let interval_us = 1_000_000 / u64::from(self.rate_hz);
        match self.last_send_us {
            None => true,
            Some(last) => now_us.saturating_sub(last) >= interval_us,
        }
    }

    pub fn mark_sent(&mut self, now_us: u64) {
        self.last_send_us = Some(now_us);
    }
}

/// Robot state broadcaster
pub struct TelemetryChannel<D> {
    transport: D,
    robot_id: String,
    rate: StreamRate,
    sent: u32,
    failed: u32,
}

impl<D: DatagramTransport> TelemetryChannel<D> {
    pub fn new(transport: D, robot_id: &str, rate_hz: u32) -> Self {
        Self {
            transport,
            robot_id: robot_id.to_string(),
            rate: StreamRate::new(rate_hz),
            sent: 0,
            failed: 0,
        }
    }

    /// Send one report now, regardless of rate
    pub fn broadcast_state<H, T>(
        &mut self,
        follower: &LineFollower<H, T>,
        pos_x: i32,
        pos_y: i32,
        battery: u8,
    ) where
        H: Actuation + LineSensor,
        T: TimeSource,
    {
        let report =
            RobotStateReport::new(&self.robot_id, (pos_x, pos_y), battery, &follower.status());

        let payload = match codec::encode_report(&report) {
            Ok(payload) => payload,
            Err(err) => {
                crate::log_debug!("Telemetry encode failed: {}", err);
                self.failed += 1;
                return;
            }
        };

        match self.transport.send_datagram(&payload) {
            Ok(()) => {
                self.sent += 1;
                crate::log_trace!("Telemetry sent: {} bytes", payload.len());
            }
            Err(err) => {
                self.failed += 1;
                crate::log_debug!("Telemetry send failed: {}", err);
            }
        }
    }

    /// Send a report if the stream rate allows it
    ///
    /// Returns `true` if a send was attempted.
    pub fn maybe_broadcast<H, T>(
        &mut self,
        now_us: u64,
        follower: &LineFollower<H, T>,
        pos_x: i32,
        pos_y: i32,
        battery: u8,
    ) -> bool
    where
        H: Actuation + LineSensor,
        T: TimeSource,
    {
        if !self.rate.should_send(now_us) {
            return false;
        }
        self.broadcast_state(follower, pos_x, pos_y, battery);
        self.rate.mark_sent(now_us);
        true
    }

    pub fn robot_id(&self) -> &str {
        &self.robot_id
    }

    pub fn rate(&self) -> &StreamRate {
        &self.rate
    }

    pub fn set_rate(&mut self, rate_hz: u32) {
        self.rate = StreamRate::new(rate_hz);
    }

    /// Datagrams handed to the transport successfully
    pub fn sent_count(&self) -> u32 {
        self.sent
    }

    /// Reports that could not be encoded or sent
    pub fn failed_count(&self) -> u32 {
        self.failed
    }

    pub fn transport(&self) -> &D {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut D {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::transport::MockDatagramTransport;
    use crate::platform::SimulatedRobot;
    use line_rover_core::parameters::FollowerParams;
    use line_rover_core::sensors::SensorSnapshot;
    use line_rover_core::traits::MockTime;
    use serde_json::Value;

    fn follower(time: &MockTime) -> LineFollower<SimulatedRobot, &MockTime> {
        LineFollower::new(SimulatedRobot::new(), time, FollowerParams::immediate())
    }

    #[test]
    fn test_stream_rate() {
        let mut rate = StreamRate::new(2);
        assert!(rate.should_send(0));
        rate.mark_sent(0);
        assert!(!rate.should_send(499_999));
        assert!(rate.should_send(500_000));
    }

    #[test]
    fn test_stream_rate_disabled() {
        let rate = StreamRate::new(0);
        assert!(!rate.should_send(0));
        assert!(!rate.should_send(10_000_000));
    }

    #[test]
    fn test_broadcast_state_fields() {
        let time = MockTime::new();
        let mut f = follower(&time);
        f.hardware_mut().push(SensorSnapshot::from_bits(0b01110));
        f.set_path("4");
        f.start();
        f.update();

        let mut channel = TelemetryChannel::new(MockDatagramTransport::new(), "R01", 2);
        channel.broadcast_state(&f, 120, 350, 80);

        let text = channel.transport().last_text().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "ROBOT_STATE");
        assert_eq!(value["robot_id"], "R01");
        assert_eq!(value["pos_x"], 120);
        assert_eq!(value["pos_y"], 350);
        assert_eq!(value["battery"], 80);
        assert_eq!(value["state"], 1);
        assert_eq!(value["node"], "start");

        let sensors = value["sensors"].as_array().unwrap();
        assert_eq!(sensors.len(), 5);
        assert!(sensors
            .iter()
            .all(|s| s.as_u64() == Some(0) || s.as_u64() == Some(1)));
        assert_eq!(channel.sent_count(), 1);
    }

    #[test]
    fn test_send_failure_is_swallowed() {
        let time = MockTime::new();
        let f = follower(&time);
        let mut transport = MockDatagramTransport::new();
        transport.set_fail_sends(true);

        let mut channel = TelemetryChannel::new(transport, "R01", 2);
        channel.broadcast_state(&f, 0, 0, 100);
        assert_eq!(channel.sent_count(), 0);
        assert_eq!(channel.failed_count(), 1);
    }

    #[test]
    fn test_maybe_broadcast_respects_rate() {
        let time = MockTime::new();
        let f = follower(&time);
        let mut channel = TelemetryChannel::new(MockDatagramTransport::new(), "R02", 4);

        assert!(channel.maybe_broadcast(0, &f, 0, 0, 90));
        assert!(!channel.maybe_broadcast(100_000, &f, 0, 0, 90));
        assert!(channel.maybe_broadcast(250_000, &f, 0, 0, 90));
        assert_eq!(channel.transport().sent().len(), 2);
    }

    #[test]
    fn test_battery_is_clamped() {
        let time = MockTime::new();
        let f = follower(&time);
        let mut channel = TelemetryChannel::new(MockDatagramTransport::new(), "R01", 1);
        channel.broadcast_state(&f, 0, 0, 180);

        let value: Value = serde_json::from_str(&channel.transport().last_text().unwrap()).unwrap();
        assert_eq!(value["battery"], 100);
        assert_eq!(value["state"], 0);
        assert_eq!(value["node"], "-");
    }
}
