use crate::core::telemetry::metrics::{LoadAverage, SystemMetrics};
use crate::core::telemetry::probe::SystemReading;

/// `now` is in Unix seconds
pub fn sample(reading: &SystemReading, now: u64) -> SystemMetrics {
    let [one, five, fifteen] = reading.load_average;
    SystemMetrics {
        uptime_secs: Some(now.saturating_sub(reading.boot_time)),
        load_average: Some(LoadAverage { one, five, fifteen }),
        process_count: Some(reading.process_count),
        kernel: reading.kernel_release.clone(),
        host_name: reading.host_name.clone(),
    }
}
