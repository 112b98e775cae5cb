//! Outbound acknowledgements

use core::fmt::{self, Write};

use heapless::String;
use serde::Serialize;

/// Capacity of a response message
pub const RESPONSE_MSG_LEN: usize = 128;

/// Result of handling one command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Success,
    Fail,
}

/// One response line, produced exactly once per handled command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: Outcome,
    pub msg: String<RESPONSE_MSG_LEN>,
}

impl Response {
    pub fn new(status: Outcome, msg: &str) -> Self {
        Self {
            status,
            msg: super::bounded(msg),
        }
    }

    pub fn success(msg: &str) -> Self {
        Self::new(Outcome::Success, msg)
    }

    pub fn fail(msg: &str) -> Self {
        Self::new(Outcome::Fail, msg)
    }

    /// Build a response from format arguments
    ///
    /// Text past [`RESPONSE_MSG_LEN`] is dropped.
    pub fn formatted(status: Outcome, args: fmt::Arguments<'_>) -> Self {
        let mut writer = Truncating(String::new());
        let _ = writer.write_fmt(args);
        Self {
            status,
            msg: writer.0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Outcome::Success
    }
}

/// Writer that keeps whatever fits
struct Truncating(String<RESPONSE_MSG_LEN>);

impl Write for Truncating {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}
