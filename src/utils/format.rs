//! Display formatting helpers for transport and library figures

/// Format a playback position as `mm:ss`
///
/// Minutes are not wrapped into hours, so a 75 minute position renders as
/// `75:00`. Negative or non-finite input renders as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }

    let whole = seconds.floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Format a total library duration given in minutes
pub fn format_total_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes} min");
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}
