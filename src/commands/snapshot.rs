use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::ArgMatches;

use super::watch::{emit, load_preferences, OutputMode};
use crate::core::telemetry::public_ip::FETCHING;
use crate::core::telemetry::TieredScheduler;
use crate::platform::detect_probes;

const PUBLIC_IP_WAIT: Duration = Duration::from_secs(3);

/// Cold-start tick, a second tick one second later so rates and CPU
/// usage have a baseline, then print once.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let prefs = load_preferences();
    let mode = match OutputMode::from_matches(matches) {
        OutputMode::Compact => OutputMode::Full,
        other => other,
    };

    let mut scheduler = TieredScheduler::new(detect_probes(&prefs.public_ip_url));
    scheduler.tick();
    thread::sleep(Duration::from_secs(1));
    scheduler.tick();

    let deadline = Instant::now() + PUBLIC_IP_WAIT;
    while scheduler.store().snapshot().network.public_ip == FETCHING && Instant::now() < deadline
    {
        thread::sleep(Duration::from_millis(100));
        scheduler.collect_public_ip();
    }

    emit(scheduler.store().snapshot(), mode, prefs.theme)
}
