// UI and formatting module

pub mod formatters;
pub mod summary;

pub use formatters::{format_bytes, format_speed, format_uptime};
pub use summary::{compact_lines, render_compact, render_report};
