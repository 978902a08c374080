use crate::core::telemetry::metrics::BatteryMetrics;
use crate::core::telemetry::probe::BatteryReading;

/// Apply one power-source scan.
///
/// With no battery only `present` changes; level, charging and time
/// remaining keep whatever was last read. Returns whether fresh values
/// were written.
pub fn apply(metrics: &mut BatteryMetrics, reading: Option<&BatteryReading>) -> bool {
    let Some(reading) = reading else {
        metrics.present = false;
        return false;
    };

    metrics.present = true;
    metrics.level_percent = Some(reading.level_percent.clamp(0.0, 100.0));
    metrics.charging = Some(reading.charging);
    metrics.time_remaining_minutes = if reading.charging {
        None
    } else {
        reading.time_to_empty_minutes
    };
    true
}
