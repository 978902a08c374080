//! Sensor bus over Linux hwmon chips and battery power-supply nodes.
//!
//! Keys are `<chip>/<label>` (e.g. `coretemp/Package id 0`, `thinkpad/fan1`)
//! and `<supply>/<attribute>` (e.g. `BAT0/current_now`). A `*/` prefix
//! matches the first chip exposing that label.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::telemetry::SensorBus;
use crate::error::{Result, VitalError};

const HWMON_ROOT: &str = "/sys/class/hwmon";
const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

#[derive(Debug, Clone)]
struct SensorSource {
    path: PathBuf,
    /// Multiplier from the raw sysfs unit to °C, RPM, mA or V
    scale: f64,
}

#[derive(Debug, Default)]
pub struct HwmonBus {
    sources: BTreeMap<String, SensorSource>,
}

impl HwmonBus {
    pub fn new() -> Self {
        Self::scan(Path::new(HWMON_ROOT), Path::new(POWER_SUPPLY_ROOT))
    }

    pub fn scan(hwmon_root: &Path, power_supply_root: &Path) -> Self {
        let mut sources = BTreeMap::new();
        index_hwmon(hwmon_root, &mut sources);
        index_batteries(power_supply_root, &mut sources);
        debug!("hwmon bus indexed {} sensors", sources.len());
        Self { sources }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    fn lookup(&self, key: &str) -> Option<&SensorSource> {
        match key.strip_prefix("*/") {
            Some(label) => self
                .sources
                .iter()
                .find(|(k, _)| k.rsplit_once('/').map(|(_, l)| l) == Some(label))
                .map(|(_, s)| s),
            None => self.sources.get(key),
        }
    }
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(_) => return Vec::new(),
    };
    entries.sort();
    entries
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn index_hwmon(root: &Path, sources: &mut BTreeMap<String, SensorSource>) {
    for chip in sorted_entries(root) {
        let Some(chip_name) = read_trimmed(&chip.join("name")) else {
            continue;
        };

        for file in sorted_entries(&chip) {
            let Some(file_name) = file.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(sensor) = file_name.strip_suffix("_input") else {
                continue;
            };

            let scale = if sensor.starts_with("temp") {
                0.001
            } else if sensor.starts_with("fan") {
                1.0
            } else {
                continue;
            };

            let label = read_trimmed(&chip.join(format!("{}_label", sensor)))
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| sensor.to_string());

            sources
                .entry(format!("{}/{}", chip_name, label))
                .or_insert(SensorSource {
                    path: file.clone(),
                    scale,
                });
            // labelled sensors stay addressable by their raw name
            if label != sensor {
                sources
                    .entry(format!("{}/{}", chip_name, sensor))
                    .or_insert(SensorSource { path: file, scale });
            }
        }
    }
}

fn index_batteries(root: &Path, sources: &mut BTreeMap<String, SensorSource>) {
    for supply in sorted_entries(root) {
        let Some(name) = supply.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with("BAT") {
            continue;
        }
        // µA to mA, µV to V
        for (attribute, scale) in [("current_now", 0.001), ("voltage_now", 0.000_001)] {
            let path = supply.join(attribute);
            if path.exists() {
                sources.insert(format!("{}/{}", name, attribute), SensorSource { path, scale });
            }
        }
    }
}

impl SensorBus for HwmonBus {
    fn is_connected(&self) -> bool {
        !self.sources.is_empty()
    }

    fn read(&mut self, key: &str) -> Result<f64> {
        let source = self
            .lookup(key)
            .ok_or_else(|| VitalError::unavailable(format!("no sensor {}", key)))?;
        let raw = fs::read_to_string(&source.path)?;
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|e| VitalError::transient(format!("{}: {}", key, e)))?;
        Ok(value * source.scale)
    }
}
