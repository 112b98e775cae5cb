//! Coordinator communication
//!
//! - `transport`: line (TCP) and datagram (UDP) transports behind traits
//! - `codec`: JSON encoding of protocol types
//! - `dispatcher`: routes one command line to exactly one response
//! - `command_channel`: stream connection polled once per cycle
//! - `telemetry`: rate-limited robot state datagrams

pub mod codec;
pub mod command_channel;
pub mod dispatcher;
pub mod telemetry;
pub mod transport;

pub use command_channel::CommandChannel;
pub use dispatcher::{AcknowledgeOnly, CommandDispatcher, CommandExtensions};
pub use telemetry::TelemetryChannel;
