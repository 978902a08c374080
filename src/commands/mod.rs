// Command handlers module
pub mod snapshot;
pub mod watch;
