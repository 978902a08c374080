//! Continuous sampling driven by a one-second interval.

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::core::config::{Preferences, Theme};
use crate::core::telemetry::{MetricsSnapshot, TieredScheduler};
use crate::platform::detect_probes;
use crate::ui::{render_compact, render_report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Compact,
    Full,
    Json,
}

impl OutputMode {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        if matches.get_flag("json") {
            OutputMode::Json
        } else if matches.get_flag("full") {
            OutputMode::Full
        } else {
            OutputMode::Compact
        }
    }
}

pub fn emit(snapshot: &MetricsSnapshot, mode: OutputMode, theme: Theme) -> Result<()> {
    match mode {
        OutputMode::Json => {
            let json = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
            println!("{}", json);
        }
        OutputMode::Full => println!("{}\n", render_report(snapshot, theme)),
        OutputMode::Compact => println!("{}", render_compact(snapshot, theme)),
    }
    Ok(())
}

pub fn load_preferences() -> Preferences {
    Preferences::load().unwrap_or_else(|e| {
        warn!("Using default preferences: {}", e);
        Preferences::default()
    })
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let prefs = load_preferences();
    let interval_ms = matches
        .get_one::<u64>("interval")
        .copied()
        .unwrap_or(prefs.tick_interval_ms)
        .max(100);
    let background = matches.get_flag("background");
    let limit = matches.get_one::<u64>("count").copied();
    let mode = OutputMode::from_matches(matches);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let scheduler = TieredScheduler::new(detect_probes(&prefs.public_ip_url));
    runtime.block_on(run(scheduler, interval_ms, background, limit, mode, prefs.theme))
}

async fn run(
    mut scheduler: TieredScheduler,
    interval_ms: u64,
    background: bool,
    limit: Option<u64>,
    mode: OutputMode,
    theme: Theme,
) -> Result<()> {
    let mut ticker = interval(Duration::from_millis(interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lifecycle = LifecycleSignals::new()?;
    let mut ticks = 0u64;

    info!(
        "Sampling every {} ms{}",
        interval_ms,
        if background { " (background)" } else { "" }
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = if background {
                    scheduler.tick_background()
                } else {
                    scheduler.tick()
                };
                if report.paused {
                    continue;
                }
                if !background {
                    emit(scheduler.store().snapshot(), mode, theme)?;
                }
                ticks += 1;
                if limit.is_some_and(|n| ticks >= n) {
                    break;
                }
            }
            event = lifecycle.next() => match event {
                Lifecycle::Sleep => scheduler.pause(),
                Lifecycle::Wake => {
                    if wake(&mut scheduler, background) {
                        emit(scheduler.store().snapshot(), mode, theme)?;
                    }
                    ticker.reset();
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    Ok(())
}

/// Resume and run the catch-up tick right away.
///
/// Returns whether the fresh snapshot should be printed; background mode
/// stays silent.
fn wake(scheduler: &mut TieredScheduler, background: bool) -> bool {
    if !scheduler.resume() {
        return false;
    }
    if background {
        scheduler.tick_background();
        false
    } else {
        scheduler.tick();
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Sleep,
    Wake,
}

/// SIGUSR1 suspends sampling, SIGUSR2 resumes it
#[cfg(unix)]
struct LifecycleSignals {
    sleep: tokio::signal::unix::Signal,
    wake: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl LifecycleSignals {
    fn new() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            sleep: signal(SignalKind::user_defined1()).context("Failed to watch SIGUSR1")?,
            wake: signal(SignalKind::user_defined2()).context("Failed to watch SIGUSR2")?,
        })
    }

    async fn next(&mut self) -> Lifecycle {
        loop {
            tokio::select! {
                Some(()) = self.sleep.recv() => return Lifecycle::Sleep,
                Some(()) = self.wake.recv() => return Lifecycle::Wake,
                else => std::future::pending::<()>().await,
            }
        }
    }
}

#[cfg(not(unix))]
struct LifecycleSignals;

#[cfg(not(unix))]
impl LifecycleSignals {
    fn new() -> Result<Self> {
        Ok(Self)
    }

    async fn next(&mut self) -> Lifecycle {
        std::future::pending().await
    }
}
