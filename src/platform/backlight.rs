//! Screen brightness from `/sys/class/backlight`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::telemetry::BrightnessProbe;
use crate::error::{Result, VitalError};

const BACKLIGHT_ROOT: &str = "/sys/class/backlight";

pub struct BacklightProbe {
    root: PathBuf,
    device: Option<PathBuf>,
}

impl BacklightProbe {
    pub fn new() -> Self {
        Self::with_root(BACKLIGHT_ROOT)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            device: None,
        }
    }

    fn devices(&self) -> Result<Vec<PathBuf>> {
        let mut devices: Vec<PathBuf> = fs::read_dir(&self.root)?
            .flatten()
            .map(|e| e.path())
            .collect();
        devices.sort();
        Ok(devices)
    }
}

impl Default for BacklightProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn read_u64(path: &Path) -> Result<u64> {
    fs::read_to_string(path)?
        .trim()
        .parse::<u64>()
        .map_err(|e| VitalError::transient(format!("{}: {}", path.display(), e)))
}

fn read_percent(device: &Path) -> Result<f32> {
    let max = read_u64(&device.join("max_brightness"))?;
    if max == 0 {
        return Err(VitalError::unavailable(format!(
            "{} reports zero max brightness",
            device.display()
        )));
    }
    // actual_brightness reflects firmware changes; brightness is the request
    let current = read_u64(&device.join("actual_brightness"))
        .or_else(|_| read_u64(&device.join("brightness")))?;
    Ok((current as f64 / max as f64 * 100.0) as f32)
}

impl BrightnessProbe for BacklightProbe {
    fn acquire(&mut self) -> Result<()> {
        let device = self
            .devices()?
            .into_iter()
            .find(|d| read_u64(&d.join("max_brightness")).map(|m| m > 0).unwrap_or(false))
            .ok_or_else(|| VitalError::unavailable("no backlight device"))?;
        self.device = Some(device);
        Ok(())
    }

    fn read_cached(&mut self) -> Result<f32> {
        let device = self
            .device
            .as_deref()
            .ok_or_else(|| VitalError::unavailable("backlight handle not acquired"))?;
        read_percent(device)
    }

    fn read_fallback(&mut self) -> Result<f32> {
        for device in self.devices()? {
            if let Ok(percent) = read_percent(&device) {
                return Ok(percent);
            }
        }
        Err(VitalError::unavailable("no readable backlight device"))
    }
}
