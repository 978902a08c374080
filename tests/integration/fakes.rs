//! Scriptable probes shared by the integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use vitalstat::core::telemetry::{
    AddressRecord, BatteryReading, BrightnessProbe, CoreTicks, GpuProvider, GpuReading,
    GpuVendor, HostProbe, InterfaceCounters, MemoryReading, PublicIpResolver, SensorBus,
    SsdHealthProbe, SystemReading, VolumeReading,
};
use vitalstat::error::{Result, VitalError};

#[derive(Debug, Default)]
pub struct HostState {
    pub ticks: Option<Vec<CoreTicks>>,
    pub interfaces: Vec<InterfaceCounters>,
    pub addresses: Vec<AddressRecord>,
    pub memory: Option<MemoryReading>,
    pub volume: Option<VolumeReading>,
    pub battery: Option<BatteryReading>,
    pub refresh_rate: Option<u32>,
    pub frequency: Option<u64>,
    pub system: Option<SystemReading>,
    pub calls: HashMap<&'static str, usize>,
}

impl HostState {
    pub fn calls(&self, name: &str) -> usize {
        self.calls.get(name).copied().unwrap_or(0)
    }

    pub fn set_ticks(&mut self, ticks: &[(u64, u64, u64, u64)]) {
        self.ticks = Some(
            ticks
                .iter()
                .map(|&(u, s, i, n)| CoreTicks::new(u, s, i, n))
                .collect(),
        );
    }
}

/// Host whose readings the test edits through the shared handle
#[derive(Clone, Default)]
pub struct FakeHost {
    pub state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A healthy laptop-ish machine
    pub fn populated() -> Self {
        let host = Self::new();
        {
            let mut state = host.state.lock();
            state.set_ticks(&[(100, 50, 850, 0), (100, 50, 850, 0)]);
            state.interfaces = vec![
                InterfaceCounters::new("en0", 1000, 800),
                InterfaceCounters::new("utun3", 200, 100),
            ];
            state.memory = Some(MemoryReading {
                total_bytes: 8 * 1024 * 1024,
                page_size: 4096,
                active_pages: 512,
                wired_pages: 256,
                compressed_pages: 256,
                swap_total_bytes: 0,
                swap_used_bytes: 0,
            });
            state.volume = Some(VolumeReading {
                name: "nvme0n1p2".into(),
                total_bytes: 1000,
                available_bytes: 250,
            });
            state.battery = Some(BatteryReading {
                level_percent: 80.0,
                charging: false,
                time_to_empty_minutes: Some(240),
                energy_rate_watts: Some(9.0),
            });
            state.refresh_rate = Some(0);
            state.frequency = Some(2400);
            state.system = Some(SystemReading {
                boot_time: 0,
                load_average: [1.0, 0.5, 0.25],
                process_count: 200,
                kernel_release: "6.8.0-test".into(),
                host_name: Some("fake".into()),
            });
        }
        host
    }

    fn record(&self, name: &'static str) {
        *self.state.lock().calls.entry(name).or_insert(0) += 1;
    }
}

fn missing<T>(what: &str) -> Result<T> {
    Err(VitalError::unavailable(what.to_string()))
}

impl HostProbe for FakeHost {
    fn cpu_ticks(&mut self) -> Result<Vec<CoreTicks>> {
        self.record("cpu");
        self.state.lock().ticks.clone().map_or_else(|| missing("cpu"), Ok)
    }

    fn cpu_model(&mut self) -> Option<String> {
        Some("Fake CPU".into())
    }

    fn cpu_frequency_mhz(&mut self) -> Result<u64> {
        self.record("frequency");
        self.state.lock().frequency.map_or_else(|| missing("frequency"), Ok)
    }

    fn memory(&mut self) -> Result<MemoryReading> {
        self.record("memory");
        self.state.lock().memory.clone().map_or_else(|| missing("memory"), Ok)
    }

    fn network_interfaces(&mut self) -> Result<Vec<InterfaceCounters>> {
        self.record("network");
        Ok(self.state.lock().interfaces.clone())
    }

    fn interface_addresses(&mut self) -> Result<Vec<AddressRecord>> {
        Ok(self.state.lock().addresses.clone())
    }

    fn root_volume(&mut self) -> Result<VolumeReading> {
        self.record("disk");
        self.state.lock().volume.clone().map_or_else(|| missing("disk"), Ok)
    }

    fn internal_battery(&mut self) -> Result<Option<BatteryReading>> {
        self.record("battery");
        Ok(self.state.lock().battery.clone())
    }

    fn display_refresh_rate(&mut self) -> Result<u32> {
        self.state.lock().refresh_rate.map_or_else(|| missing("refresh"), Ok)
    }

    fn system(&mut self) -> Result<SystemReading> {
        self.record("system");
        self.state.lock().system.clone().map_or_else(|| missing("system"), Ok)
    }
}

/// Implements nothing; every query is unavailable
pub struct EmptyHost;

impl HostProbe for EmptyHost {}

/// Key/value sensor bus
#[derive(Clone, Default)]
pub struct FakeBus {
    pub values: Arc<Mutex<HashMap<String, f64>>>,
    pub reads: Arc<Mutex<Vec<String>>>,
    pub connected: bool,
}

impl FakeBus {
    pub fn with(values: &[(&str, f64)]) -> Self {
        Self {
            values: Arc::new(Mutex::new(
                values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            )),
            reads: Arc::default(),
            connected: true,
        }
    }
}

impl SensorBus for FakeBus {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn read(&mut self, key: &str) -> Result<f64> {
        self.reads.lock().push(key.to_string());
        self.values
            .lock()
            .get(key)
            .copied()
            .ok_or_else(|| VitalError::unavailable(key.to_string()))
    }
}

#[derive(Clone, Default)]
pub struct FakeSsd {
    pub life: Arc<Mutex<Option<u8>>>,
    pub queries: Arc<Mutex<usize>>,
}

impl SsdHealthProbe for FakeSsd {
    fn life_remaining(&mut self) -> Result<u8> {
        *self.queries.lock() += 1;
        self.life.lock().map_or_else(|| missing("nvme"), Ok)
    }

    fn smart_status_ok(&mut self) -> Result<bool> {
        missing("smart")
    }
}

#[derive(Clone, Default)]
pub struct FakeBacklight {
    pub acquisitions: Arc<Mutex<usize>>,
    pub cached: Arc<Mutex<Option<f32>>>,
    pub fallback: Arc<Mutex<Option<f32>>>,
}

impl BrightnessProbe for FakeBacklight {
    fn acquire(&mut self) -> Result<()> {
        *self.acquisitions.lock() += 1;
        Ok(())
    }

    fn read_cached(&mut self) -> Result<f32> {
        self.cached.lock().map_or_else(|| missing("cached"), Ok)
    }

    fn read_fallback(&mut self) -> Result<f32> {
        self.fallback.lock().map_or_else(|| missing("fallback"), Ok)
    }
}

pub struct FixedIp(pub &'static str);

impl PublicIpResolver for FixedIp {
    fn resolve(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

pub struct OfflineIp;

impl PublicIpResolver for OfflineIp {
    fn resolve(&self) -> Result<String> {
        Err(VitalError::transient("offline"))
    }
}

/// GPU that always reports the same reading
pub struct FakeGpu(pub GpuReading);

impl GpuProvider for FakeGpu {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Amd
    }

    fn name(&self) -> String {
        "Fake GPU".to_string()
    }

    fn collect_metrics(&mut self) -> Result<GpuReading> {
        Ok(self.0)
    }

    fn is_available(&self) -> bool {
        true
    }
}
