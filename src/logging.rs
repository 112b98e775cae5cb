//! Logging abstraction
//!
//! Firmware code logs through the `log_*!` macros so call sites do not
//! depend on a particular backend. On the host the macros forward to
//! `tracing`; the binary calls [`init`] to install the subscriber.
//!
//! ```ignore
//! use line_rover::log_info;
//!
//! log_info!("Path installed: {} operators", 4);
//! ```

#[doc(hidden)]
pub use tracing as __tracing;

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "ROVER_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Filter from `directives`, or `info` when they are absent or invalid
///
/// Accepts the usual `EnvFilter` syntax, e.g. `debug` or
/// `info,line_rover::rover=trace`.
pub fn filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global fmt subscriber filtered by `ROVER_LOG`
pub fn init() -> Result<(), SetGlobalDefaultError> {
    let directives = std::env::var(LOG_ENV).ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter(directives.as_deref()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::info!($($arg)*)
    };
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::warn!($($arg)*)
    };
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::error!($($arg)*)
    };
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::debug!($($arg)*)
    };
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::trace!($($arg)*)
    };
}
