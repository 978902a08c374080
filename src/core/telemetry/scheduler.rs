//! Multi-cadence driver for the domain samplers.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use chrono::Utc;
use log::{debug, info, trace};
use serde::Serialize;

use super::network::NetworkInterfaceRegistry;
use super::probe::{CoreTicks, GpuProvider, HostProbe, Probes, SsdHealthProbe};
use super::public_ip::PublicIpFetch;
use super::samplers::{battery, cpu, disk, gpu, memory, power, system};
use super::sensors::{
    BrightnessMonitor, SensorCatalog, SensorResolver, SsdHealthCache, TEMPERATURE_RANGE,
};
use super::store::MetricsStore;
use crate::error::VitalError;

/// The counter restarts here; 300 is a multiple of every tier period
pub const COUNTER_WRAP: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchedulerTier {
    Fast,
    Medium,
    Slow,
    VerySlow,
    Glacial,
}

impl SchedulerTier {
    pub const ALL: [SchedulerTier; 5] = [
        SchedulerTier::Fast,
        SchedulerTier::Medium,
        SchedulerTier::Slow,
        SchedulerTier::VerySlow,
        SchedulerTier::Glacial,
    ];

    /// Period in ticks (seconds)
    pub fn period(self) -> u32 {
        match self {
            SchedulerTier::Fast => 1,
            SchedulerTier::Medium => 2,
            SchedulerTier::Slow => 3,
            SchedulerTier::VerySlow => 10,
            SchedulerTier::Glacial => 30,
        }
    }

    /// Domains in the order they are sampled
    pub fn domains(self) -> &'static [Domain] {
        match self {
            SchedulerTier::Fast => &[Domain::Cpu, Domain::Network],
            SchedulerTier::Medium => &[Domain::Memory, Domain::Gpu],
            SchedulerTier::Slow => &[Domain::Thermal, Domain::Power, Domain::CpuFrequency],
            SchedulerTier::VerySlow => &[Domain::Battery, Domain::System, Domain::Brightness],
            SchedulerTier::Glacial => &[Domain::Disk, Domain::SsdHealth, Domain::PublicIp],
        }
    }

    pub fn is_due(self, counter: u32) -> bool {
        counter % self.period() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Domain {
    Cpu,
    Network,
    Memory,
    Gpu,
    Thermal,
    Power,
    CpuFrequency,
    Battery,
    System,
    Brightness,
    Disk,
    SsdHealth,
    PublicIp,
}

impl Domain {
    pub fn tier(self) -> SchedulerTier {
        match self {
            Domain::Cpu | Domain::Network => SchedulerTier::Fast,
            Domain::Memory | Domain::Gpu => SchedulerTier::Medium,
            Domain::Thermal | Domain::Power | Domain::CpuFrequency => SchedulerTier::Slow,
            Domain::Battery | Domain::System | Domain::Brightness => SchedulerTier::VerySlow,
            Domain::Disk | Domain::SsdHealth | Domain::PublicIp => SchedulerTier::Glacial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DomainOutcome {
    Updated,
    /// Not obtainable here; the field stays `None`
    Unavailable,
    /// Failed this tick; the next scheduled tick is the retry
    TransientFailure,
    /// No fresh reading; previous values kept
    Retained,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub counter: u32,
    pub full_pass: bool,
    pub background: bool,
    pub paused: bool,
    pub tiers: Vec<SchedulerTier>,
    pub outcomes: Vec<(Domain, DomainOutcome)>,
}

impl TickReport {
    pub fn outcome(&self, domain: Domain) -> Option<DomainOutcome> {
        self.outcomes
            .iter()
            .find(|(d, _)| *d == domain)
            .map(|(_, o)| *o)
    }

    pub fn sampled(&self, domain: Domain) -> bool {
        self.outcome(domain).is_some()
    }
}

fn classify(domain: Domain, err: &VitalError) -> DomainOutcome {
    if err.is_unavailable() {
        trace!("{:?} unavailable: {}", domain, err);
        DomainOutcome::Unavailable
    } else {
        debug!("{:?} read failed: {}", domain, err);
        DomainOutcome::TransientFailure
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Owns the store and every raw source; runs due samplers on each tick.
///
/// A tick always completes. Sampler failures become [`DomainOutcome`]s in
/// the returned [`TickReport`].
pub struct TieredScheduler {
    counter: u32,
    bootstrapped: bool,
    force_full: bool,
    paused: bool,
    store: MetricsStore,
    host: Box<dyn HostProbe>,
    gpu: Option<Box<dyn GpuProvider>>,
    resolver: SensorResolver,
    brightness: Option<BrightnessMonitor>,
    ssd: Option<Box<dyn SsdHealthProbe>>,
    ssd_cache: SsdHealthCache,
    public_ip: PublicIpFetch,
    network: NetworkInterfaceRegistry,
    previous_ticks: Option<Vec<CoreTicks>>,
}

impl TieredScheduler {
    pub fn new(probes: Probes) -> Self {
        Self::with_catalog(probes, SensorCatalog::default())
    }

    pub fn with_catalog(probes: Probes, catalog: SensorCatalog) -> Self {
        let Probes {
            mut host,
            sensors,
            fallback_sensors,
            gpu,
            brightness,
            ssd,
            public_ip,
        } = probes;

        let mut store = MetricsStore::new();
        {
            let snapshot = store.snapshot_mut();
            snapshot.cpu.model = host.cpu_model().unwrap_or_default();
            if let Some(provider) = gpu.as_ref() {
                snapshot.gpu.vendor = provider.vendor();
                snapshot.gpu.name = Some(provider.name());
            }
        }

        Self {
            counter: 0,
            bootstrapped: false,
            force_full: false,
            paused: false,
            store,
            host,
            gpu,
            resolver: SensorResolver::new(sensors, fallback_sensors, catalog),
            brightness: brightness.map(BrightnessMonitor::new),
            ssd,
            ssd_cache: SsdHealthCache::default(),
            public_ip: PublicIpFetch::new(public_ip),
            network: NetworkInterfaceRegistry::new(),
            previous_ticks: None,
        }
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn network(&self) -> &NetworkInterfaceRegistry {
        &self.network
    }

    /// Full-cadence entry point, called once per second while displayed
    pub fn tick(&mut self) -> TickReport {
        if self.paused {
            return self.paused_report(false);
        }
        self.collect_public_ip();

        self.counter = self.counter % COUNTER_WRAP + 1;
        let full_pass = !self.bootstrapped || self.force_full;
        self.bootstrapped = true;
        self.force_full = false;

        let tiers: Vec<SchedulerTier> = SchedulerTier::ALL
            .into_iter()
            .filter(|tier| full_pass || tier.is_due(self.counter))
            .collect();

        let mut outcomes = Vec::new();
        for tier in &tiers {
            for &domain in tier.domains() {
                outcomes.push((domain, self.sample(domain)));
            }
        }

        self.store.snapshot_mut().updated_at = Some(Utc::now());
        trace!("tick {} ran {:?}", self.counter, tiers);

        TickReport {
            counter: self.counter,
            full_pass,
            background: false,
            paused: false,
            tiers,
            outcomes,
        }
    }

    /// Reduced entry point while nothing is displayed: Fast tier only.
    ///
    /// The next [`tick`](Self::tick) runs every tier.
    pub fn tick_background(&mut self) -> TickReport {
        if self.paused {
            return self.paused_report(true);
        }
        self.collect_public_ip();

        if !self.force_full {
            debug!("Background sampling; next full tick catches up");
        }
        self.force_full = true;

        let outcomes = SchedulerTier::Fast
            .domains()
            .iter()
            .map(|&domain| (domain, self.sample(domain)))
            .collect();
        self.store.snapshot_mut().updated_at = Some(Utc::now());

        TickReport {
            counter: self.counter,
            full_pass: false,
            background: true,
            paused: false,
            tiers: vec![SchedulerTier::Fast],
            outcomes,
        }
    }

    /// Stop sampling until [`resume`](Self::resume)
    pub fn pause(&mut self) {
        if !self.paused {
            info!("Telemetry paused");
        }
        self.paused = true;
    }

    /// Re-enable sampling and arm a full-tier catch-up on the next tick.
    ///
    /// Returns whether the scheduler was paused.
    pub fn resume(&mut self) -> bool {
        let was_paused = self.paused;
        if was_paused {
            info!("Telemetry resumed");
        }
        self.paused = false;
        self.force_full = true;
        was_paused
    }

    pub fn select_next_interface(&mut self) -> bool {
        let moved = self.network.select_next();
        self.publish_network();
        moved
    }

    pub fn select_previous_interface(&mut self) -> bool {
        let moved = self.network.select_previous();
        self.publish_network();
        moved
    }

    fn paused_report(&self, background: bool) -> TickReport {
        TickReport {
            counter: self.counter,
            background,
            paused: true,
            ..Default::default()
        }
    }

    /// Store the public IP if the background lookup has finished
    pub fn collect_public_ip(&mut self) -> bool {
        match self.public_ip.poll() {
            Some(ip) => {
                self.store.snapshot_mut().network.public_ip = ip;
                true
            }
            None => false,
        }
    }

    fn sample(&mut self, domain: Domain) -> DomainOutcome {
        match domain {
            Domain::Cpu => self.sample_cpu(),
            Domain::Network => self.sample_network(),
            Domain::Memory => self.sample_memory(),
            Domain::Gpu => self.sample_gpu(),
            Domain::Thermal => self.sample_thermal(),
            Domain::Power => self.sample_power(),
            Domain::CpuFrequency => self.sample_cpu_frequency(),
            Domain::Battery => self.sample_battery(),
            Domain::System => self.sample_system(),
            Domain::Brightness => self.sample_brightness(),
            Domain::Disk => self.sample_disk(),
            Domain::SsdHealth => self.sample_ssd(),
            Domain::PublicIp => self.sample_public_ip(),
        }
    }

    fn sample_cpu(&mut self) -> DomainOutcome {
        let ticks = match self.host.cpu_ticks() {
            Ok(ticks) => ticks,
            Err(e) => return classify(Domain::Cpu, &e),
        };

        let usage = cpu::usage_percent(self.previous_ticks.as_deref(), &ticks);
        let cpu = &mut self.store.snapshot_mut().cpu;
        cpu.usage_percent = Some(usage);
        cpu.core_count = ticks.len();
        self.previous_ticks = Some(ticks);
        self.store.history_mut().push_cpu(usage);
        DomainOutcome::Updated
    }

    fn sample_network(&mut self) -> DomainOutcome {
        let counters = match self.host.network_interfaces() {
            Ok(counters) => counters,
            Err(e) => return classify(Domain::Network, &e),
        };
        let addresses = self.host.interface_addresses().unwrap_or_else(|e| {
            trace!("interface addresses: {}", e);
            Vec::new()
        });

        self.network.update(&counters, &addresses, Instant::now());
        self.publish_network();

        let network = &self.store.snapshot().network;
        let (speed_in, speed_out) = (network.speed_in, network.speed_out);
        self.store.history_mut().push_network(speed_in, speed_out);
        DomainOutcome::Updated
    }

    fn publish_network(&mut self) {
        self.network
            .write_metrics(&mut self.store.snapshot_mut().network);
    }

    fn sample_memory(&mut self) -> DomainOutcome {
        let reading = match self.host.memory() {
            Ok(reading) => reading,
            Err(e) => return classify(Domain::Memory, &e),
        };
        let Some(metrics) = memory::sample(&reading) else {
            return DomainOutcome::Retained;
        };

        let percent = metrics.usage_percent;
        self.store.snapshot_mut().memory = Some(metrics);
        self.store.history_mut().push_memory(percent);
        DomainOutcome::Updated
    }

    fn sample_gpu(&mut self) -> DomainOutcome {
        let mut updated = false;

        let reading = match self.gpu.as_mut() {
            Some(provider) if provider.is_available() => match provider.collect_metrics() {
                Ok(reading) => Some(reading),
                Err(e) => {
                    classify(Domain::Gpu, &e);
                    None
                }
            },
            _ => None,
        };

        // The provider's own sensor is the first candidate of the gpu chain
        let temperature = reading
            .and_then(|r| r.temperature_celsius)
            .filter(|&t| TEMPERATURE_RANGE.contains(f64::from(t)))
            .or_else(|| self.resolver.gpu_temperature().value().map(|v| v as f32));
        let refresh_rate = self.host.display_refresh_rate().ok().map(gpu::refresh_rate);

        let snapshot = self.store.snapshot_mut();
        snapshot.gpu.temperature_celsius = temperature;
        snapshot.gpu.refresh_rate_hz = refresh_rate;
        updated |= temperature.is_some() || refresh_rate.is_some();

        if let Some(reading) = reading {
            let utilization = gpu::utilization(reading.utilization_percent);
            self.store.snapshot_mut().gpu.utilization_percent = Some(utilization);
            self.store.history_mut().push_gpu(utilization);
            updated = true;
        }

        if updated {
            DomainOutcome::Updated
        } else {
            DomainOutcome::Unavailable
        }
    }

    fn sample_thermal(&mut self) -> DomainOutcome {
        let temperature = self.resolver.cpu_temperature().value().map(|v| v as f32);
        let fans = self.resolver.fan_speeds();
        let found = temperature.is_some() || !fans.is_empty();

        let snapshot = self.store.snapshot_mut();
        snapshot.cpu.temperature_celsius = temperature;
        snapshot.thermal.fans = fans;

        if found {
            DomainOutcome::Updated
        } else {
            DomainOutcome::Unavailable
        }
    }

    fn sample_power(&mut self) -> DomainOutcome {
        let battery = match self.host.internal_battery() {
            Ok(Some(battery)) => battery,
            Ok(None) => return DomainOutcome::Retained,
            Err(e) => return classify(Domain::Power, &e),
        };

        let current = self.resolver.battery_current_ma().value();
        let voltage = self.resolver.battery_voltage().value();
        match power::watts(current, voltage, battery.energy_rate_watts) {
            Some(watts) => {
                self.store.snapshot_mut().power.watts = Some(watts);
                DomainOutcome::Updated
            }
            None => {
                self.store.snapshot_mut().power.watts = None;
                DomainOutcome::Unavailable
            }
        }
    }

    fn sample_cpu_frequency(&mut self) -> DomainOutcome {
        match self.host.cpu_frequency_mhz() {
            Ok(mhz) if mhz > 0 => {
                self.store.snapshot_mut().cpu.frequency_mhz = Some(mhz);
                DomainOutcome::Updated
            }
            Ok(_) => {
                self.store.snapshot_mut().cpu.frequency_mhz = None;
                DomainOutcome::Unavailable
            }
            Err(e) => classify(Domain::CpuFrequency, &e),
        }
    }

    fn sample_battery(&mut self) -> DomainOutcome {
        match self.host.internal_battery() {
            Ok(reading) => {
                if battery::apply(&mut self.store.snapshot_mut().battery, reading.as_ref()) {
                    DomainOutcome::Updated
                } else {
                    DomainOutcome::Retained
                }
            }
            Err(e) => classify(Domain::Battery, &e),
        }
    }

    fn sample_system(&mut self) -> DomainOutcome {
        match self.host.system() {
            Ok(reading) => {
                self.store.snapshot_mut().system = system::sample(&reading, unix_now());
                DomainOutcome::Updated
            }
            Err(e) => classify(Domain::System, &e),
        }
    }

    fn sample_brightness(&mut self) -> DomainOutcome {
        let value = self.brightness.as_mut().and_then(|monitor| monitor.read());
        self.store.snapshot_mut().display.brightness_percent = value;
        if value.is_some() {
            DomainOutcome::Updated
        } else {
            DomainOutcome::Unavailable
        }
    }

    fn sample_disk(&mut self) -> DomainOutcome {
        let reading = match self.host.root_volume() {
            Ok(reading) => reading,
            Err(e) => return classify(Domain::Disk, &e),
        };
        match disk::sample(&reading) {
            Some(volume) => {
                self.store.snapshot_mut().disk.volume = Some(volume);
                DomainOutcome::Updated
            }
            None => DomainOutcome::Retained,
        }
    }

    fn sample_ssd(&mut self) -> DomainOutcome {
        let Some(probe) = self.ssd.as_mut() else {
            return DomainOutcome::Unavailable;
        };
        let health = self.ssd_cache.get(probe.as_mut(), Instant::now());
        self.store.snapshot_mut().disk.ssd_health_percent = health;
        if health.is_some() {
            DomainOutcome::Updated
        } else {
            DomainOutcome::Unavailable
        }
    }

    fn sample_public_ip(&mut self) -> DomainOutcome {
        if self.public_ip.is_started() {
            return DomainOutcome::Retained;
        }
        match self.public_ip.start() {
            Some(placeholder) => {
                self.store.snapshot_mut().network.public_ip = placeholder;
                DomainOutcome::Unavailable
            }
            None => DomainOutcome::Updated,
        }
    }
}
