// src/util/text.rs

/// Format seconds as a wall clock, `HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use medquiz::util::text::format_clock;
///
/// assert_eq!(format_clock(3725), "01:02:05");
/// ```
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Quiz timer display, `MM:SS`. Minutes are not wrapped at the hour.
pub fn format_minutes_seconds(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Human duration used in study statistics: `1h 5m`, `12m` or `40s`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}
