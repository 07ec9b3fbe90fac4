use chrono::{DateTime, Local};

/// Format a timestamp in the local timezone as `HH:MM:SS`.
pub fn format_local_time(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Current local wall-clock time as `HH:MM:SS`.
pub fn local_clock() -> String {
    format_local_time(Local::now())
}
