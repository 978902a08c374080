//! Secondary temperature bus over `/sys/class/thermal/thermal_zone*`,
//! keyed by zone type.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::telemetry::SensorBus;
use crate::error::{Result, VitalError};

const THERMAL_ROOT: &str = "/sys/class/thermal";

#[derive(Debug, Default)]
pub struct ThermalZoneBus {
    zones: Vec<(String, PathBuf)>,
}

impl ThermalZoneBus {
    pub fn new() -> Self {
        Self::scan(Path::new(THERMAL_ROOT))
    }

    pub fn scan(root: &Path) -> Self {
        let mut zones = Vec::new();
        if let Ok(entries) = fs::read_dir(root) {
            for entry in entries.flatten() {
                let path = entry.path();
                let is_zone = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("thermal_zone"))
                    .unwrap_or(false);
                if !is_zone {
                    continue;
                }
                if let Ok(kind) = fs::read_to_string(path.join("type")) {
                    zones.push((kind.trim().to_lowercase(), path.join("temp")));
                }
            }
        }
        zones.sort();
        Self { zones }
    }
}

impl SensorBus for ThermalZoneBus {
    fn is_connected(&self) -> bool {
        !self.zones.is_empty()
    }

    /// `key` matches any zone whose type contains it, case-insensitively
    fn read(&mut self, key: &str) -> Result<f64> {
        let needle = key.to_lowercase();
        let (_, path) = self
            .zones
            .iter()
            .find(|(kind, _)| kind.contains(&needle))
            .ok_or_else(|| VitalError::unavailable(format!("no thermal zone {}", key)))?;

        let raw = fs::read_to_string(path)?;
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|e| VitalError::transient(format!("{}: {}", key, e)))?;
        Ok(if value > 1000.0 { value / 1000.0 } else { value })
    }
}
