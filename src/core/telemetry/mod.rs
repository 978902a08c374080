//! Telemetry aggregation engine: tiered scheduling, per-domain samplers,
//! sensor fallback chains, interface tracking and rolling history.

pub mod history;
pub mod metrics;
pub mod network;
pub mod probe;
pub mod public_ip;
pub mod samplers;
pub mod scheduler;
pub mod sensors;
pub mod store;

pub use history::{HistoryBuffer, MetricsHistory, DEFAULT_HISTORY_SIZE};
pub use metrics::*;
pub use network::{NetworkInterfaceRegistry, NetworkInterfaceState};
pub use probe::{
    AddressRecord, BatteryReading, BrightnessProbe, CoreTicks, GpuProvider, GpuReading,
    HostProbe, InterfaceCounters, MemoryReading, Probes, PublicIpResolver, SensorBus,
    SsdHealthProbe, SystemReading, VolumeReading,
};
pub use public_ip::HttpPublicIp;
pub use scheduler::{Domain, DomainOutcome, SchedulerTier, TickReport, TieredScheduler};
pub use sensors::{PlausibleRange, SensorCatalog, SensorChain, SensorReading, SensorResolver};
pub use store::MetricsStore;
