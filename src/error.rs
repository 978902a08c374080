use std::io;
use thiserror::Error;

/// Error type for the telemetry engine and its platform probes
#[derive(Error, Debug)]
pub enum VitalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Transient failure: {0}")]
    TransientFailure(String),

    #[error("GPU not available: {0}")]
    GpuNotAvailable(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for vitalstat
pub type Result<T> = std::result::Result<T, VitalError>;

impl VitalError {
    /// Quantity not obtainable on this hardware or OS
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        VitalError::Unavailable(msg.into())
    }

    /// Read failed this tick but may succeed on the next one
    pub fn transient<S: Into<String>>(msg: S) -> Self {
        VitalError::TransientFailure(msg.into())
    }

    pub fn gpu_not_available<S: Into<String>>(msg: S) -> Self {
        VitalError::GpuNotAvailable(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        VitalError::MetricCollection(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        VitalError::Other(msg.into())
    }

    /// True when the failure means "this quantity does not exist here",
    /// as opposed to a read that may succeed on the next tick.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            VitalError::Unavailable(_) | VitalError::GpuNotAvailable(_)
        ) || matches!(self, VitalError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}
