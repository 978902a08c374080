//! Text renderings of a snapshot: the two-line compact summary and the
//! full report.

use colored::*;

use super::formatters::{format_bytes, format_celsius, format_percent, format_speed, format_uptime};
use crate::core::config::Theme;
use crate::core::telemetry::MetricsSnapshot;

/// "↓<in> C:<cpu>%" over "↑<out> M:<mem>%"
pub fn compact_lines(snapshot: &MetricsSnapshot) -> (String, String) {
    let cpu = snapshot.cpu.usage_percent.unwrap_or(0.0);
    let memory = snapshot
        .memory
        .as_ref()
        .map(|m| m.usage_percent)
        .unwrap_or(0.0);

    (
        format!("↓{} C:{:.0}%", format_speed(snapshot.network.speed_in), cpu),
        format!("↑{} M:{:.0}%", format_speed(snapshot.network.speed_out), memory),
    )
}

fn accent(text: &str, theme: Theme) -> ColoredString {
    match theme {
        Theme::Dark => text.bright_cyan(),
        Theme::Light => text.blue(),
    }
}

fn level(text: String, percent: Option<f32>) -> ColoredString {
    match percent {
        Some(p) if p >= 90.0 => text.red().bold(),
        Some(p) if p >= 75.0 => text.yellow(),
        _ => text.normal(),
    }
}

pub fn render_compact(snapshot: &MetricsSnapshot, theme: Theme) -> String {
    let (down, up) = compact_lines(snapshot);
    format!("{}\n{}", accent(&down, theme), accent(&up, theme))
}

/// Every domain, "N/A" for anything unavailable
pub fn render_report(snapshot: &MetricsSnapshot, theme: Theme) -> String {
    let mut lines = Vec::new();
    let label = |name: &str| accent(&format!("{:<10}", name), theme).bold().to_string();

    let cpu = &snapshot.cpu;
    lines.push(format!(
        "{} {} · {} cores · {} · {}",
        label("CPU"),
        level(format_percent(cpu.usage_percent), cpu.usage_percent),
        cpu.core_count,
        format_celsius(cpu.temperature_celsius),
        cpu.frequency_mhz
            .map(|f| format!("{} MHz", f))
            .unwrap_or_else(|| "N/A".to_string()),
    ));

    lines.push(match &snapshot.memory {
        Some(m) => format!(
            "{} {} · {} / {} · swap {} / {}",
            label("Memory"),
            level(format_percent(Some(m.usage_percent)), Some(m.usage_percent)),
            format_bytes(m.used_bytes),
            format_bytes(m.total_bytes),
            format_bytes(m.swap_used_bytes),
            format_bytes(m.swap_total_bytes),
        ),
        None => format!("{} N/A", label("Memory")),
    });

    let gpu = &snapshot.gpu;
    lines.push(format!(
        "{} {} · {} · {} · {}",
        label("GPU"),
        gpu.name.as_deref().unwrap_or("N/A"),
        level(format_percent(gpu.utilization_percent), gpu.utilization_percent),
        format_celsius(gpu.temperature_celsius),
        gpu.refresh_rate_hz
            .map(|hz| format!("{} Hz", hz))
            .unwrap_or_else(|| "N/A".to_string()),
    ));

    let net = &snapshot.network;
    let selected = net
        .interfaces
        .iter()
        .find(|i| Some(&i.name) == net.selected_interface.as_ref())
        .map(|i| i.display_name.clone())
        .unwrap_or_else(|| "N/A".to_string());
    lines.push(format!(
        "{} {} ↓{} ↑{} · local {} · public {} · total ↓{} ↑{}",
        label("Network"),
        selected,
        format_speed(net.speed_in),
        format_speed(net.speed_out),
        net.local_ip.as_deref().unwrap_or("N/A"),
        net.public_ip,
        format_bytes(net.total_in_bytes),
        format_bytes(net.total_out_bytes),
    ));

    let disk = &snapshot.disk;
    lines.push(match &disk.volume {
        Some(v) => format!(
            "{} {} {} · {} free · SSD health {}",
            label("Disk"),
            v.name,
            level(format_percent(Some(v.usage_percent)), Some(v.usage_percent)),
            format_bytes(v.free_bytes),
            disk.ssd_health_percent
                .map(|h| format!("{}%", h))
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        None => format!("{} N/A", label("Disk")),
    });

    let battery = &snapshot.battery;
    lines.push(if battery.present {
        format!(
            "{} {} · {} · {} · {}",
            label("Battery"),
            format_percent(battery.level_percent),
            match battery.charging {
                Some(true) => "charging",
                Some(false) => "discharging",
                None => "N/A",
            },
            battery
                .time_remaining_minutes
                .map(|m| format!("{}h {}m left", m / 60, m % 60))
                .unwrap_or_else(|| "N/A".to_string()),
            snapshot
                .power
                .watts
                .map(|w| format!("{:.1} W", w))
                .unwrap_or_else(|| "N/A".to_string()),
        )
    } else {
        format!("{} none", label("Battery"))
    });

    let fans = if snapshot.thermal.fans.is_empty() {
        "N/A".to_string()
    } else {
        snapshot
            .thermal
            .fans
            .iter()
            .map(|f| format!("fan{} {} RPM", f.slot, f.rpm))
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!(
        "{} {} · brightness {}",
        label("Thermal"),
        fans,
        format_percent(snapshot.display.brightness_percent),
    ));

    let sys = &snapshot.system;
    lines.push(format!(
        "{} {} · load {} · {} procs · {} {}",
        label("System"),
        sys.uptime_secs
            .map(format_uptime)
            .unwrap_or_else(|| "N/A".to_string()),
        sys.load_average
            .map(|l| format!("{:.2} {:.2} {:.2}", l.one, l.five, l.fifteen))
            .unwrap_or_else(|| "N/A".to_string()),
        sys.process_count
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        sys.host_name.as_deref().unwrap_or(""),
        sys.kernel,
    ));

    lines.join("\n")
}
