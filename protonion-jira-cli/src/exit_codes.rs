//! Exit code constants for CLI commands
//!
//! - 0: Success, or a healthy report
//! - 1: General error, or a degraded report
//! - 2: Critical failure, or an unhealthy report

use protonion_jira::OverallStatus;

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// General error or warnings found
pub const EXIT_WARNING: i32 = 1;

/// Critical failures
pub const EXIT_ERROR: i32 = 2;

/// Exit code reported by `doctor` for an overall status
pub fn exit_code_for(status: OverallStatus) -> i32 {
    match status {
        OverallStatus::Healthy => EXIT_SUCCESS,
        OverallStatus::Degraded => EXIT_WARNING,
        OverallStatus::Unhealthy => EXIT_ERROR,
    }
}
