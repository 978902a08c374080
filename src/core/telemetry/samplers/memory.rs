use crate::core::telemetry::metrics::MemoryMetrics;
use crate::core::telemetry::probe::MemoryReading;

/// Used = (active + wired + compressed) pages × page size.
///
/// `None` when the reading reports no physical memory.
pub fn sample(reading: &MemoryReading) -> Option<MemoryMetrics> {
    if reading.total_bytes == 0 {
        return None;
    }

    let active_bytes = reading.active_pages.saturating_mul(reading.page_size);
    let wired_bytes = reading.wired_pages.saturating_mul(reading.page_size);
    let compressed_bytes = reading.compressed_pages.saturating_mul(reading.page_size);
    let used_bytes = active_bytes
        .saturating_add(wired_bytes)
        .saturating_add(compressed_bytes)
        .min(reading.total_bytes);

    Some(MemoryMetrics {
        total_bytes: reading.total_bytes,
        used_bytes,
        active_bytes,
        wired_bytes,
        compressed_bytes,
        usage_percent: (used_bytes as f64 / reading.total_bytes as f64 * 100.0) as f32,
        swap_total_bytes: reading.swap_total_bytes,
        swap_used_bytes: reading.swap_used_bytes.min(reading.swap_total_bytes),
    })
}
