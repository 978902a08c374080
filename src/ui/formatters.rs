use humansize::{format_size, BINARY};

/// Rate in bytes per second: "512 B/s", "12.5 KB/s", "3.21 MB/s"
pub fn format_speed(bytes_per_sec: f64) -> String {
    let rate = if bytes_per_sec.is_finite() {
        bytes_per_sec.max(0.0)
    } else {
        0.0
    };

    if rate < 1024.0 {
        format!("{:.0} B/s", rate)
    } else if rate < 1024.0 * 1024.0 {
        format!("{:.1} KB/s", rate / 1024.0)
    } else {
        format!("{:.2} MB/s", rate / (1024.0 * 1024.0))
    }
}

/// Byte count in binary units
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// "↑ 2d 3h 14m", days omitted when zero
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("↑ {}d {}h {}m", days, hours, minutes)
    } else {
        format!("↑ {}h {}m", hours, minutes)
    }
}

pub fn format_percent(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.0}%", v),
        None => "N/A".to_string(),
    }
}

pub fn format_celsius(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.0}°C", v),
        None => "N/A".to_string(),
    }
}
