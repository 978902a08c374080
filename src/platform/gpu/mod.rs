//! GPU-specific platform code.
//!
//! Supports NVIDIA (via NVML) and AMD/Intel (via the DRM busy counter).

mod drm;
mod nvidia;

pub use drm::DrmGpuProvider;
pub use nvidia::NvidiaGpuProvider;

use crate::core::telemetry::GpuProvider;
use crate::error::{Result, VitalError};

/// Attempt to get an available GPU provider
///
/// Tries each supported source in order of preference:
/// 1. NVIDIA (via NVML)
/// 2. DRM sysfs (AMD, Intel)
pub fn get_gpu_provider() -> Result<Box<dyn GpuProvider>> {
    match NvidiaGpuProvider::new() {
        Ok(provider) => return Ok(Box::new(provider)),
        Err(e) => log::debug!("{}", e),
    }

    match DrmGpuProvider::new() {
        Ok(provider) => return Ok(Box::new(provider)),
        Err(e) => log::debug!("{}", e),
    }

    Err(VitalError::gpu_not_available("No supported GPU found"))
}
