//! JSON codec for the coordinator protocol
//!
//! Inbound commands are one JSON object per line; responses are written
//! back the same way. Telemetry reports are one JSON object per datagram.

use line_rover_core::protocol::{RawCommand, Response, RobotStateReport};

/// Decode one command line
pub fn decode_command(line: &str) -> Result<RawCommand, serde_json::Error> {
    serde_json::from_str(line)
}

/// Encode a response as a single line (no trailing newline)
pub fn encode_response(response: &Response) -> Result<String, serde_json::Error> {
    serde_json::to_string(response)
}

/// Encode a telemetry report as a datagram payload
pub fn encode_report(report: &RobotStateReport) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(report)
}
