//! Per-domain samplers.
//!
//! Each sampler is a pure function from the previous state and a raw
//! reading to a derived value; the scheduler owns all state.

pub mod battery;
pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod memory;
pub mod power;
pub mod system;
