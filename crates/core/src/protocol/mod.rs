//! Coordinator wire protocol types
//!
//! Commands and responses travel over the stream channel as one JSON object
//! per line; robot state travels over the datagram channel as one JSON
//! object per packet. This module defines the typed shapes only; encoding
//! and transport live in the firmware crate.
//!
//! ```text
//! -> {"cmd":"MOVE","path":"1245"}
//! <- {"status":"SUCCESS","msg":"path following started"}
//! ~> {"type":"ROBOT_STATE","robot_id":"R01",...,"sensors":[0,1,1,1,0]}
//! ```

pub mod command;
pub mod de;
pub mod response;
pub mod telemetry;

pub use command::{Command, CommandError, DeviceState, PathCode, RawCommand, PATH_CODE_LEN};
pub use response::{Outcome, Response, RESPONSE_MSG_LEN};
pub use telemetry::{ReportKind, RobotStateReport};

use heapless::String;

/// Capacity of short text fields (command names, node ids, device names)
pub const FIELD_LEN: usize = 64;

/// Short bounded text field
pub type Field = String<FIELD_LEN>;

/// Copy `text` into a bounded string, cutting at a character boundary if
/// it does not fit.
pub fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
