//! Path encoding
//!
//! The coordinator sends a pre-computed route as a string of digits, one
//! turn operator per intersection:
//!
//! | Digit | Operator |
//! |-------|----------|
//! | `1`   | Left     |
//! | `2`   | Right    |
//! | `3`   | U-turn   |
//! | `4`   | Straight |
//! | `5`   | End      |
//!
//! Any other character keeps its slot as [`PathOp::Unknown`]: the follower
//! passes that intersection without acting, so operator N still belongs to
//! intersection N.
//!
//! Paths are bounded to [`MAX_PATH_LEN`] operators so they live in static
//! memory on the robot.

use heapless::Vec;

/// Maximum number of operators in a path
pub const MAX_PATH_LEN: usize = 64;

/// Turn operator executed at an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    Left,
    Right,
    UTurn,
    Straight,
    End,
    /// Character with no operator meaning, kept as a placeholder
    Unknown(char),
}

impl PathOp {
    /// Decode one path character
    pub fn from_char(c: char) -> Self {
        match c {
            '1' => Self::Left,
            '2' => Self::Right,
            '3' => Self::UTurn,
            '4' => Self::Straight,
            '5' => Self::End,
            other => Self::Unknown(other),
        }
    }

    /// Path character for this operator
    pub fn digit(self) -> char {
        match self {
            Self::Left => '1',
            Self::Right => '2',
            Self::UTurn => '3',
            Self::Straight => '4',
            Self::End => '5',
            Self::Unknown(c) => c,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Operator name for logging
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::UTurn => "u-turn",
            Self::Straight => "straight",
            Self::End => "end",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Anomalies found while parsing a path code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseReport {
    /// Characters that are not operator digits, kept as placeholders
    pub unknown: usize,
    /// Operators beyond [`MAX_PATH_LEN`], dropped
    pub truncated: usize,
}

impl ParseReport {
    /// True if every character is a known operator and all of them fit
    pub fn is_clean(&self) -> bool {
        self.unknown == 0 && self.truncated == 0
    }
}

/// Ordered sequence of turn operators
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    ops: Vec<PathOp, MAX_PATH_LEN>,
}

impl Path {
    /// Empty path
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Parse a digit code, one operator per character
    ///
    /// Unknown characters stay in place as [`PathOp::Unknown`]; operators
    /// past the capacity are dropped. Both are counted in the returned
    /// [`ParseReport`].
    pub fn parse(code: &str) -> (Self, ParseReport) {
        let mut path = Self::new();
        let mut report = ParseReport::default();

        for op in code.chars().map(PathOp::from_char) {
            if path.ops.push(op).is_err() {
                report.truncated += 1;
                continue;
            }
            if !op.is_known() {
                report.unknown += 1;
            }
        }

        (path, report)
    }

    /// Build a path from operators, dropping any past the capacity
    pub fn from_ops(ops: &[PathOp]) -> Self {
        let mut path = Self::new();
        for &op in ops.iter().take(MAX_PATH_LEN) {
            let _ = path.ops.push(op);
        }
        path
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operator at `index`, or `None` once the path is exhausted
    pub fn get(&self, index: usize) -> Option<PathOp> {
        self.ops.get(index).copied()
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }
}
