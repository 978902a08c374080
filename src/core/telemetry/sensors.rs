//! Ranked fallback resolution of hardware sensor readings.
//!
//! Which keys to try lives in [`SensorCatalog`] (data); how to try them lives
//! in [`resolve`] (algorithm). The first candidate whose value lies inside the
//! chain's plausible range wins.

use std::time::{Duration, Instant};

use log::{debug, trace};
use once_cell::sync::Lazy;

use super::metrics::FanReading;
use super::probe::{BrightnessProbe, SensorBus, SsdHealthProbe};

/// Outcome of a fallback resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Value(f64),
    Unavailable,
}

impl SensorReading {
    pub fn value(self) -> Option<f64> {
        match self {
            SensorReading::Value(v) => Some(v),
            SensorReading::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibleRange {
    pub min: f64,
    pub max: f64,
    /// Closed ranges accept the bounds themselves
    pub inclusive: bool,
}

impl PlausibleRange {
    pub const fn open(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            inclusive: false,
        }
    }

    pub const fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            inclusive: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if self.inclusive {
            value >= self.min && value <= self.max
        } else {
            value > self.min && value < self.max
        }
    }
}

pub const TEMPERATURE_RANGE: PlausibleRange = PlausibleRange::open(0.0, 120.0);
pub const FALLBACK_TEMPERATURE_RANGE: PlausibleRange = PlausibleRange::open(0.0, 150.0);
pub const FAN_RANGE: PlausibleRange = PlausibleRange::closed(0.0, 20_000.0);
/// Battery current in mA; negative while discharging on some drivers
pub const CURRENT_RANGE: PlausibleRange = PlausibleRange::closed(-20_000.0, 20_000.0);
pub const VOLTAGE_RANGE: PlausibleRange = PlausibleRange::open(0.0, 30.0);

/// Ordered candidate keys for one physical quantity
#[derive(Debug, Clone, PartialEq)]
pub struct SensorChain {
    pub quantity: &'static str,
    pub candidates: Vec<String>,
    pub range: PlausibleRange,
}

impl SensorChain {
    pub fn new(quantity: &'static str, candidates: &[&str], range: PlausibleRange) -> Self {
        Self {
            quantity,
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            range,
        }
    }
}

/// Per-quantity candidate lists, ranked by platform
#[derive(Debug, Clone, PartialEq)]
pub struct SensorCatalog {
    pub cpu_temperature: SensorChain,
    /// Tried on the secondary bus once every primary candidate failed
    pub fallback_cpu_temperature: SensorChain,
    pub gpu_temperature: SensorChain,
    pub fan_slots: Vec<SensorChain>,
    pub battery_current: SensorChain,
    pub battery_voltage: SensorChain,
}

static HWMON_CATALOG: Lazy<SensorCatalog> = Lazy::new(|| SensorCatalog {
    cpu_temperature: SensorChain::new(
        "cpu temperature",
        &[
            "coretemp/Package id 0",
            "k10temp/Tctl",
            "k10temp/Tdie",
            "zenpower/Tdie",
            "coretemp/Core 0",
            "cpu_thermal/temp1",
            "acpitz/temp1",
        ],
        TEMPERATURE_RANGE,
    ),
    fallback_cpu_temperature: SensorChain::new(
        "cpu temperature (thermal zone)",
        &["x86_pkg_temp", "cpu-thermal", "soc_thermal", "TCPU", "acpitz"],
        FALLBACK_TEMPERATURE_RANGE,
    ),
    gpu_temperature: SensorChain::new(
        "gpu temperature",
        &["amdgpu/edge", "amdgpu/junction", "nouveau/temp1", "radeon/temp1"],
        TEMPERATURE_RANGE,
    ),
    fan_slots: vec![
        SensorChain::new("fan 0", &["thinkpad/fan1", "dell_smm/fan1", "*/fan1"], FAN_RANGE),
        SensorChain::new("fan 1", &["thinkpad/fan2", "dell_smm/fan2", "*/fan2"], FAN_RANGE),
    ],
    battery_current: SensorChain::new(
        "battery current",
        &["BAT0/current_now", "BAT1/current_now"],
        CURRENT_RANGE,
    ),
    battery_voltage: SensorChain::new(
        "battery voltage",
        &["BAT0/voltage_now", "BAT1/voltage_now"],
        VOLTAGE_RANGE,
    ),
});

impl Default for SensorCatalog {
    fn default() -> Self {
        HWMON_CATALOG.clone()
    }
}

/// Try each candidate in order; the first in-range reading wins.
pub fn resolve(bus: &mut dyn SensorBus, chain: &SensorChain) -> SensorReading {
    if !bus.is_connected() {
        return SensorReading::Unavailable;
    }

    for key in &chain.candidates {
        match bus.read(key) {
            Ok(value) if chain.range.contains(value) => {
                trace!("{}: resolved {} = {}", chain.quantity, key, value);
                return SensorReading::Value(value);
            }
            Ok(value) => {
                debug!(
                    "{}: rejected {} = {} (outside plausible range)",
                    chain.quantity, key, value
                );
            }
            Err(e) => trace!("{}: {} failed: {}", chain.quantity, key, e),
        }
    }

    SensorReading::Unavailable
}

/// Primary and secondary sensor connections plus the catalog to drive them
pub struct SensorResolver {
    primary: Box<dyn SensorBus>,
    secondary: Box<dyn SensorBus>,
    catalog: SensorCatalog,
}

impl SensorResolver {
    pub fn new(
        primary: Box<dyn SensorBus>,
        secondary: Box<dyn SensorBus>,
        catalog: SensorCatalog,
    ) -> Self {
        Self {
            primary,
            secondary,
            catalog,
        }
    }

    pub fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    pub fn cpu_temperature(&mut self) -> SensorReading {
        match resolve(self.primary.as_mut(), &self.catalog.cpu_temperature) {
            SensorReading::Unavailable => resolve(
                self.secondary.as_mut(),
                &self.catalog.fallback_cpu_temperature,
            ),
            found => found,
        }
    }

    pub fn gpu_temperature(&mut self) -> SensorReading {
        resolve(self.primary.as_mut(), &self.catalog.gpu_temperature)
    }

    /// Present fans only; a stalled fan reports 0 RPM and is kept
    pub fn fan_speeds(&mut self) -> Vec<FanReading> {
        let primary = self.primary.as_mut();
        self.catalog
            .fan_slots
            .iter()
            .enumerate()
            .filter_map(|(slot, chain)| {
                resolve(&mut *primary, chain).value().map(|rpm| FanReading {
                    slot,
                    rpm: rpm.round() as u32,
                })
            })
            .collect()
    }

    pub fn battery_current_ma(&mut self) -> SensorReading {
        resolve(self.primary.as_mut(), &self.catalog.battery_current)
    }

    pub fn battery_voltage(&mut self) -> SensorReading {
        resolve(self.primary.as_mut(), &self.catalog.battery_voltage)
    }
}

pub const SSD_HEALTH_TTL: Duration = Duration::from_secs(60);

/// SSD wear cache; the underlying walk runs at most once per TTL
#[derive(Debug, Clone)]
pub struct SsdHealthCache {
    ttl: Duration,
    cached: Option<(Instant, Option<u8>)>,
}

impl SsdHealthCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, cached: None }
    }

    pub fn get(&mut self, probe: &mut dyn SsdHealthProbe, now: Instant) -> Option<u8> {
        if let Some((at, value)) = self.cached {
            if now.saturating_duration_since(at) < self.ttl {
                return value;
            }
        }

        let value = resolve_ssd_health(probe);
        self.cached = Some((now, value));
        value
    }
}

impl Default for SsdHealthCache {
    fn default() -> Self {
        Self::new(SSD_HEALTH_TTL)
    }
}

/// NVMe life remaining first, then the coarse SMART verdict
pub fn resolve_ssd_health(probe: &mut dyn SsdHealthProbe) -> Option<u8> {
    match probe.life_remaining() {
        Ok(life) => return Some(life.min(100)),
        Err(e) => trace!("ssd life remaining: {}", e),
    }

    match probe.smart_status_ok() {
        Ok(true) => Some(100),
        Ok(false) => Some(50),
        Err(e) => {
            trace!("ssd smart status: {}", e);
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleState {
    Untried,
    Acquired,
    Failed,
}

/// Brightness reader holding its handle across ticks
pub struct BrightnessMonitor {
    probe: Box<dyn BrightnessProbe>,
    handle: HandleState,
}

impl BrightnessMonitor {
    pub fn new(probe: Box<dyn BrightnessProbe>) -> Self {
        Self {
            probe,
            handle: HandleState::Untried,
        }
    }

    pub fn read(&mut self) -> Option<f32> {
        if self.handle == HandleState::Untried {
            self.handle = match self.probe.acquire() {
                Ok(()) => HandleState::Acquired,
                Err(e) => {
                    debug!("brightness handle unavailable: {}", e);
                    HandleState::Failed
                }
            };
        }

        if self.handle == HandleState::Acquired {
            match self.probe.read_cached() {
                Ok(v) => return Some(v.clamp(0.0, 100.0)),
                Err(e) => trace!("cached brightness read failed: {}", e),
            }
        }

        self.probe.read_fallback().ok().map(|v| v.clamp(0.0, 100.0))
    }
}
