use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete telemetry snapshot.
///
/// `None` always means "not obtainable", never zero. A reading of zero
/// (idle CPU, stalled fan) is carried as `Some(0)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub updated_at: Option<DateTime<Utc>>,
    pub cpu: CpuMetrics,
    pub memory: Option<MemoryMetrics>,
    pub gpu: GpuMetrics,
    pub network: NetworkMetrics,
    pub disk: DiskMetrics,
    pub battery: BatteryMetrics,
    pub power: PowerMetrics,
    pub thermal: ThermalMetrics,
    pub display: DisplayMetrics,
    pub system: SystemMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub usage_percent: Option<f32>,
    pub core_count: usize,
    pub model: String,
    pub temperature_celsius: Option<f32>,
    pub frequency_mhz: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryMetrics {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub active_bytes: u64,
    pub wired_bytes: u64,
    pub compressed_bytes: u64,
    pub usage_percent: f32,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GpuMetrics {
    pub vendor: GpuVendor,
    pub name: Option<String>,
    pub utilization_percent: Option<f32>,
    pub temperature_celsius: Option<f32>,
    pub refresh_rate_hz: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub interfaces: Vec<InterfaceSummary>,
    pub selected_interface: Option<String>,
    /// Bytes per second on the selected interface
    pub speed_in: f64,
    pub speed_out: f64,
    pub local_ip: Option<String>,
    /// Cumulative bytes summed over every active interface
    pub total_in_bytes: u64,
    pub total_out_bytes: u64,
    pub public_ip: String,
}

impl Default for NetworkMetrics {
    fn default() -> Self {
        Self {
            interfaces: Vec::new(),
            selected_interface: None,
            speed_in: 0.0,
            speed_out: 0.0,
            local_ip: None,
            total_in_bytes: 0,
            total_out_bytes: 0,
            public_ip: crate::core::telemetry::public_ip::FETCHING.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterfaceSummary {
    pub name: String,
    pub display_name: String,
    pub speed_in: f64,
    pub speed_out: f64,
    pub local_ip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskMetrics {
    pub volume: Option<VolumeMetrics>,
    pub ssd_health_percent: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VolumeMetrics {
    pub name: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub usage_percent: f32,
}

/// Battery fields survive a tick that finds no battery; only `present` flips.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatteryMetrics {
    pub present: bool,
    pub level_percent: Option<f32>,
    pub charging: Option<bool>,
    pub time_remaining_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerMetrics {
    pub watts: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThermalMetrics {
    pub fans: Vec<FanReading>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FanReading {
    pub slot: usize,
    pub rpm: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub brightness_percent: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SystemMetrics {
    pub uptime_secs: Option<u64>,
    pub load_average: Option<LoadAverage>,
    pub process_count: Option<usize>,
    pub kernel: String,
    pub host_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}
