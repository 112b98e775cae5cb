//! Parameter error types

/// Errors from parameter validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// Value outside its allowed range
    OutOfRange {
        name: &'static str,
        value: u32,
        max: u32,
    },
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParameterError::OutOfRange { name, value, max } => {
                write!(f, "{} = {} exceeds maximum {}", name, value, max)
            }
        }
    }
}
