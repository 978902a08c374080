//! AMD and Intel GPUs through the DRM sysfs busy counter.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::telemetry::{GpuProvider, GpuReading, GpuVendor};
use crate::error::{Result, VitalError};

const DRM_ROOT: &str = "/sys/class/drm";
const VENDOR_AMD: &str = "0x1002";
const VENDOR_INTEL: &str = "0x8086";

pub struct DrmGpuProvider {
    busy_path: PathBuf,
    temp_path: Option<PathBuf>,
    vendor: GpuVendor,
    name: String,
}

impl DrmGpuProvider {
    pub fn new() -> Result<Self> {
        Self::discover(Path::new(DRM_ROOT))
    }

    /// First `cardN` exposing a busy counter under `root`
    pub fn discover(root: &Path) -> Result<Self> {
        let mut cards: Vec<PathBuf> = fs::read_dir(root)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("card") && !n.contains('-'))
                    .unwrap_or(false)
            })
            .collect();
        cards.sort();

        for card in cards {
            let Some(busy_path) = first_existing_path(&[
                card.join("device/gpu_busy_percent"),
                card.join("gpu_busy_percent"),
                card.join("gt/gt0/busy_percent"),
            ]) else {
                continue;
            };

            let vendor = match fs::read_to_string(card.join("device/vendor")) {
                Ok(id) if id.trim() == VENDOR_AMD => GpuVendor::Amd,
                Ok(id) if id.trim() == VENDOR_INTEL => GpuVendor::Intel,
                _ => GpuVendor::Unknown,
            };
            let card_name = card
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            return Ok(Self {
                busy_path,
                temp_path: hwmon_temp_path(&card),
                vendor,
                name: format!("{:?} GPU ({})", vendor, card_name),
            });
        }

        Err(VitalError::gpu_not_available("no DRM card exposes gpu_busy_percent"))
    }
}

fn first_existing_path(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|p| p.exists()).cloned()
}

fn hwmon_temp_path(card: &Path) -> Option<PathBuf> {
    fs::read_dir(card.join("device/hwmon"))
        .ok()?
        .flatten()
        .map(|entry| entry.path().join("temp1_input"))
        .find(|p| p.exists())
}

fn read_number(path: &Path) -> Result<f64> {
    let raw = fs::read_to_string(path)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|e| VitalError::transient(format!("{}: {}", path.display(), e)))
}

impl GpuProvider for DrmGpuProvider {
    fn vendor(&self) -> GpuVendor {
        self.vendor
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_available(&self) -> bool {
        self.busy_path.exists()
    }

    fn collect_metrics(&mut self) -> Result<GpuReading> {
        let busy = read_number(&self.busy_path)?;
        // millidegrees
        let temperature = self
            .temp_path
            .as_deref()
            .and_then(|p| read_number(p).ok())
            .map(|milli| (milli / 1000.0) as f32);

        Ok(GpuReading {
            utilization_percent: busy as f32,
            temperature_celsius: temperature,
        })
    }
}
