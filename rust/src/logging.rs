//! Logging macros for the optimizer with verbosity level control.
//!
//! Messages are routed through the `log` facade, so the host application
//! decides where they end up. Verbosity levels:
//! - 0: SILENT (warnings only)
//! - 1: CHANGES (solve outcomes, chosen duration and cost)
//! - 2: CHECKS (model sizes, bound estimates)
//! - 3: DEBUG (per-activity values read back from the solver)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: solve outcomes, optimal duration and total cost.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            ::log::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: model construction summaries, bound estimates.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            ::log::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: raw solver values, per-activity schedule decisions.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            ::log::trace!($($arg)*);
        }
    };
}
