// vitalstat library - public API

// Re-export error types
pub mod error;
pub use error::{Result, VitalError};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::Preferences;
pub use core::telemetry::{MetricsSnapshot, Probes, TickReport, TieredScheduler};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
