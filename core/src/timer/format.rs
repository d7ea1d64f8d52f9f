//! Elapsed time formatting

use std::time::Duration;

/// Format an elapsed duration as `HH:MM:SS`.
///
/// Hours are not wrapped, so 100 hours renders as `100:00:00`.
/// Fractional seconds are truncated.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs / 60) % 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
