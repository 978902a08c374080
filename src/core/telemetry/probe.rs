//! Raw-source seams for the telemetry engine.
//!
//! Every query fails soft: implementations return `VitalError::Unavailable`
//! when the quantity does not exist on this machine and
//! `VitalError::TransientFailure` (or an IO error) when a read merely failed.
//! Default methods report the quantity as unavailable so a probe only
//! implements what its platform can provide.

use std::net::IpAddr;

use super::metrics::GpuVendor;
use crate::error::{Result, VitalError};

/// Absolute per-core scheduler tick counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreTicks {
    pub user: u64,
    pub system: u64,
    pub idle: u64,
    pub nice: u64,
}

impl CoreTicks {
    pub fn new(user: u64, system: u64, idle: u64, nice: u64) -> Self {
        Self {
            user,
            system,
            idle,
            nice,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub page_size: u64,
    pub active_pages: u64,
    pub wired_pages: u64,
    pub compressed_pages: u64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
}

/// Cumulative byte counters for one interface
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceCounters {
    pub name: String,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl InterfaceCounters {
    pub fn new(name: impl Into<String>, bytes_in: u64, bytes_out: u64) -> Self {
        Self {
            name: name.into(),
            bytes_in,
            bytes_out,
        }
    }
}

/// One address assigned to an interface
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    pub interface: String,
    pub addr: IpAddr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeReading {
    pub name: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryReading {
    pub level_percent: f32,
    pub charging: bool,
    pub time_to_empty_minutes: Option<u32>,
    pub energy_rate_watts: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemReading {
    /// Unix seconds
    pub boot_time: u64,
    pub load_average: [f64; 3],
    pub process_count: usize,
    pub kernel_release: String,
    pub host_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuReading {
    pub utilization_percent: f32,
    pub temperature_celsius: Option<f32>,
}

/// Operating-system queries: counters, capacities, power sources
pub trait HostProbe: Send {
    fn cpu_ticks(&mut self) -> Result<Vec<CoreTicks>> {
        Err(VitalError::unavailable("cpu ticks"))
    }

    /// Static processor description, read once
    fn cpu_model(&mut self) -> Option<String> {
        None
    }

    fn cpu_frequency_mhz(&mut self) -> Result<u64> {
        Err(VitalError::unavailable("cpu frequency"))
    }

    fn memory(&mut self) -> Result<MemoryReading> {
        Err(VitalError::unavailable("memory"))
    }

    fn network_interfaces(&mut self) -> Result<Vec<InterfaceCounters>> {
        Err(VitalError::unavailable("network interfaces"))
    }

    fn interface_addresses(&mut self) -> Result<Vec<AddressRecord>> {
        Ok(Vec::new())
    }

    fn root_volume(&mut self) -> Result<VolumeReading> {
        Err(VitalError::unavailable("root volume"))
    }

    /// `Ok(None)` when the machine has no internal battery
    fn internal_battery(&mut self) -> Result<Option<BatteryReading>> {
        Ok(None)
    }

    fn display_refresh_rate(&mut self) -> Result<u32> {
        Err(VitalError::unavailable("display refresh rate"))
    }

    fn system(&mut self) -> Result<SystemReading> {
        Err(VitalError::unavailable("system"))
    }
}

/// Keyed low-level sensor connection (hwmon, thermal zones, ...)
pub trait SensorBus: Send {
    /// Precomputed once; a disconnected bus is never queried
    fn is_connected(&self) -> bool;

    /// Read one sensor in its natural unit (°C, RPM, mA, V)
    fn read(&mut self, key: &str) -> Result<f64>;
}

/// Bus with nothing behind it
#[derive(Debug, Default)]
pub struct DisconnectedBus;

impl SensorBus for DisconnectedBus {
    fn is_connected(&self) -> bool {
        false
    }

    fn read(&mut self, key: &str) -> Result<f64> {
        Err(VitalError::unavailable(format!("sensor bus not connected ({key})")))
    }
}

/// Trait for GPU metrics providers
///
/// Abstracts GPU monitoring across vendors. Implementations live in the
/// platform layer.
pub trait GpuProvider: Send {
    fn vendor(&self) -> GpuVendor;

    fn name(&self) -> String;

    fn collect_metrics(&mut self) -> Result<GpuReading>;

    fn is_available(&self) -> bool;
}

/// Screen brightness source with an expensive-to-open preferred handle
pub trait BrightnessProbe: Send {
    /// Open the preferred handle; called at most once
    fn acquire(&mut self) -> Result<()>;

    /// Read through the handle opened by `acquire`, as 0..=100
    fn read_cached(&mut self) -> Result<f32>;

    /// Slow path walking every candidate device
    fn read_fallback(&mut self) -> Result<f32>;
}

/// Evidence about SSD wear
pub trait SsdHealthProbe: Send {
    /// Percentage of rated endurance left
    fn life_remaining(&mut self) -> Result<u8>;

    /// Overall SMART verdict: true when the drive reports itself healthy
    fn smart_status_ok(&mut self) -> Result<bool>;
}

/// Blocking lookup of the externally visible address
pub trait PublicIpResolver: Send {
    fn resolve(&self) -> Result<String>;
}

/// Every raw source the scheduler drives
pub struct Probes {
    pub host: Box<dyn HostProbe>,
    pub sensors: Box<dyn SensorBus>,
    pub fallback_sensors: Box<dyn SensorBus>,
    pub gpu: Option<Box<dyn GpuProvider>>,
    pub brightness: Option<Box<dyn BrightnessProbe>>,
    pub ssd: Option<Box<dyn SsdHealthProbe>>,
    pub public_ip: Option<Box<dyn PublicIpResolver>>,
}

impl Probes {
    pub fn new(host: Box<dyn HostProbe>) -> Self {
        Self {
            host,
            sensors: Box::new(DisconnectedBus),
            fallback_sensors: Box::new(DisconnectedBus),
            gpu: None,
            brightness: None,
            ssd: None,
            public_ip: None,
        }
    }

    pub fn with_sensors(mut self, bus: Box<dyn SensorBus>) -> Self {
        self.sensors = bus;
        self
    }

    pub fn with_fallback_sensors(mut self, bus: Box<dyn SensorBus>) -> Self {
        self.fallback_sensors = bus;
        self
    }

    pub fn with_gpu(mut self, gpu: Box<dyn GpuProvider>) -> Self {
        self.gpu = Some(gpu);
        self
    }

    pub fn with_brightness(mut self, probe: Box<dyn BrightnessProbe>) -> Self {
        self.brightness = Some(probe);
        self
    }

    pub fn with_ssd(mut self, probe: Box<dyn SsdHealthProbe>) -> Self {
        self.ssd = Some(probe);
        self
    }

    pub fn with_public_ip(mut self, resolver: Box<dyn PublicIpResolver>) -> Self {
        self.public_ip = Some(resolver);
        self
    }
}
