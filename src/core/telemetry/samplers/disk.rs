use crate::core::telemetry::metrics::VolumeMetrics;
use crate::core::telemetry::probe::VolumeReading;

/// Root volume usage; `None` when the volume reports zero capacity
pub fn sample(reading: &VolumeReading) -> Option<VolumeMetrics> {
    if reading.total_bytes == 0 {
        return None;
    }
    let free_bytes = reading.available_bytes.min(reading.total_bytes);
    let used = reading.total_bytes - free_bytes;

    Some(VolumeMetrics {
        name: reading.name.clone(),
        total_bytes: reading.total_bytes,
        free_bytes,
        usage_percent: (used as f64 / reading.total_bytes as f64 * 100.0) as f32,
    })
}
