#[cfg(feature = "nvml")]
use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, Device, Nvml};

use crate::core::telemetry::{GpuProvider, GpuReading, GpuVendor};
use crate::error::{Result, VitalError};

/// NVIDIA GPU provider using NVML
pub struct NvidiaGpuProvider {
    #[cfg(feature = "nvml")]
    nvml: Nvml,
    device_index: u32,
    name: String,
}

impl NvidiaGpuProvider {
    /// Initializes NVML and selects the first GPU
    pub fn new() -> Result<Self> {
        Self::with_device_index(0)
    }

    pub fn with_device_index(index: u32) -> Result<Self> {
        #[cfg(feature = "nvml")]
        {
            let nvml = Nvml::init().map_err(|e| {
                VitalError::gpu_not_available(format!("Failed to init NVML: {}", e))
            })?;

            let name = nvml
                .device_by_index(index)
                .map_err(|e| {
                    VitalError::gpu_not_available(format!("GPU {} not found: {}", index, e))
                })?
                .name()
                .unwrap_or_else(|_| "Unknown NVIDIA GPU".to_string());

            Ok(Self {
                nvml,
                device_index: index,
                name,
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            let _ = index;
            Err(VitalError::gpu_not_available("NVIDIA GPU support not enabled"))
        }
    }

    #[cfg(feature = "nvml")]
    fn get_device(&self) -> Result<Device<'_>> {
        self.nvml.device_by_index(self.device_index).map_err(|e| {
            VitalError::transient(format!("Failed to get GPU {}: {}", self.device_index, e))
        })
    }
}

impl GpuProvider for NvidiaGpuProvider {
    fn vendor(&self) -> GpuVendor {
        GpuVendor::Nvidia
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_available(&self) -> bool {
        #[cfg(feature = "nvml")]
        {
            self.get_device().is_ok()
        }
        #[cfg(not(feature = "nvml"))]
        {
            false
        }
    }

    fn collect_metrics(&mut self) -> Result<GpuReading> {
        #[cfg(feature = "nvml")]
        {
            let device = self.get_device()?;

            let utilization = device.utilization_rates().map_err(|e| {
                VitalError::metric_collection(format!("Failed to get utilization: {}", e))
            })?;

            let temperature = device
                .temperature(TemperatureSensor::Gpu)
                .ok()
                .map(|t| t as f32);

            Ok(GpuReading {
                utilization_percent: utilization.gpu as f32,
                temperature_celsius: temperature,
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            Err(VitalError::gpu_not_available("NVIDIA GPU support not enabled"))
        }
    }
}
