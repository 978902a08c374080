//! Platform probes for Linux and other Unix hosts.

pub mod backlight;
pub mod gpu;
pub mod host;
pub mod hwmon;
pub mod nvme;
pub mod thermal_zone;

pub use backlight::BacklightProbe;
pub use gpu::get_gpu_provider;
pub use host::SysinfoHost;
pub use hwmon::HwmonBus;
pub use nvme::NvmeHealthProbe;
pub use thermal_zone::ThermalZoneBus;

use crate::core::telemetry::{HttpPublicIp, Probes};

/// Every probe this machine offers, with `public_ip_url` as the address lookup
pub fn detect_probes(public_ip_url: &str) -> Probes {
    let mut probes = Probes::new(Box::new(SysinfoHost::new()))
        .with_sensors(Box::new(HwmonBus::new()))
        .with_fallback_sensors(Box::new(ThermalZoneBus::new()))
        .with_brightness(Box::new(BacklightProbe::new()))
        .with_ssd(Box::new(NvmeHealthProbe::new()))
        .with_public_ip(Box::new(HttpPublicIp::new(public_ip_url)));

    match get_gpu_provider() {
        Ok(gpu) => probes = probes.with_gpu(gpu),
        Err(e) => log::info!("{}", e),
    }

    probes
}
