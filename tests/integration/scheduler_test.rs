use std::thread;
use std::time::{Duration, Instant};

use vitalstat::core::telemetry::public_ip::{FETCHING, UNRESOLVED};
use vitalstat::core::telemetry::{
    Domain, DomainOutcome, Probes, SchedulerTier, TieredScheduler, DEFAULT_HISTORY_SIZE,
};

use super::fakes::{EmptyHost, FakeHost, FixedIp, OfflineIp};

fn scheduler_with(host: &FakeHost) -> TieredScheduler {
    TieredScheduler::new(Probes::new(Box::new(host.clone())))
}

#[test]
fn test_first_tick_runs_every_tier() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);

    let report = scheduler.tick();
    assert_eq!(report.counter, 1);
    assert!(report.full_pass);
    assert_eq!(report.tiers, SchedulerTier::ALL.to_vec());
    assert_eq!(report.outcomes.len(), 13);

    let snapshot = scheduler.store().snapshot();
    assert_eq!(snapshot.cpu.usage_percent, Some(0.0));
    assert_eq!(snapshot.cpu.model, "Fake CPU");
    assert!(snapshot.memory.is_some());
    assert!(snapshot.disk.volume.is_some());
    assert!(snapshot.battery.present);
    assert_eq!(snapshot.system.process_count, Some(200));
    assert!(snapshot.updated_at.is_some());
}

#[test]
fn test_cadence_after_bootstrap() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();

    let expected: &[(u32, &[SchedulerTier])] = &[
        (2, &[SchedulerTier::Fast, SchedulerTier::Medium]),
        (3, &[SchedulerTier::Fast, SchedulerTier::Slow]),
        (4, &[SchedulerTier::Fast, SchedulerTier::Medium]),
        (5, &[SchedulerTier::Fast]),
        (6, &[SchedulerTier::Fast, SchedulerTier::Medium, SchedulerTier::Slow]),
    ];
    for (counter, tiers) in expected {
        let report = scheduler.tick();
        assert_eq!(report.counter, *counter);
        assert!(!report.full_pass);
        assert_eq!(report.tiers, tiers.to_vec(), "tick {}", counter);
    }

    while scheduler.counter() < 29 {
        scheduler.tick();
    }
    let report = scheduler.tick();
    assert_eq!(report.counter, 30);
    assert_eq!(report.tiers, SchedulerTier::ALL.to_vec());
}

#[test]
fn test_domains_follow_fixed_order() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    let report = scheduler.tick();
    let order: Vec<Domain> = report.outcomes.iter().map(|(d, _)| *d).collect();
    assert_eq!(
        order,
        vec![
            Domain::Cpu,
            Domain::Network,
            Domain::Memory,
            Domain::Gpu,
            Domain::Thermal,
            Domain::Power,
            Domain::CpuFrequency,
            Domain::Battery,
            Domain::System,
            Domain::Brightness,
            Domain::Disk,
            Domain::SsdHealth,
            Domain::PublicIp,
        ]
    );
}

#[test]
fn test_counter_wraps_without_full_pass() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    for _ in 0..300 {
        scheduler.tick();
    }
    assert_eq!(scheduler.counter(), 300);

    let report = scheduler.tick();
    assert_eq!(report.counter, 1);
    assert!(!report.full_pass);
    assert_eq!(report.tiers, vec![SchedulerTier::Fast]);
}

#[test]
fn test_resume_forces_full_pass() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();
    scheduler.tick();
    scheduler.tick();

    scheduler.pause();
    let cpu_calls = host.state.lock().calls("cpu");
    let report = scheduler.tick();
    assert!(report.paused);
    assert!(report.outcomes.is_empty());
    assert!(scheduler.tick_background().paused);
    assert_eq!(host.state.lock().calls("cpu"), cpu_calls);

    assert!(scheduler.resume());
    let report = scheduler.tick();
    // counter 4 would normally select Fast and Medium only
    assert_eq!(report.counter, 4);
    assert!(report.full_pass);
    assert_eq!(report.tiers, SchedulerTier::ALL.to_vec());

    let report = scheduler.tick();
    assert_eq!(report.tiers, vec![SchedulerTier::Fast]);
}

#[test]
fn test_resume_without_pause_still_catches_up() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();
    assert!(!scheduler.resume());
    assert!(scheduler.tick().full_pass);
}

#[test]
fn test_background_samples_fast_tier_only() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();
    let memory_calls = host.state.lock().calls("memory");

    for _ in 0..3 {
        let report = scheduler.tick_background();
        assert!(report.background);
        assert_eq!(report.tiers, vec![SchedulerTier::Fast]);
        assert!(report.sampled(Domain::Cpu));
        assert!(report.sampled(Domain::Network));
        assert!(!report.sampled(Domain::Memory));
    }
    assert_eq!(host.state.lock().calls("memory"), memory_calls);
    assert_eq!(scheduler.store().history().cpu_usage.len(), 4);
    assert_eq!(scheduler.store().history().memory_usage.len(), 1);

    let report = scheduler.tick();
    assert!(report.full_pass);
    assert_eq!(report.tiers, SchedulerTier::ALL.to_vec());
}

#[test]
fn test_tick_completes_when_nothing_is_available() {
    let mut scheduler = TieredScheduler::new(Probes::new(Box::new(EmptyHost)));
    let report = scheduler.tick();
    assert_eq!(report.outcomes.len(), 13);
    assert_eq!(report.outcome(Domain::Cpu), Some(DomainOutcome::Unavailable));
    assert_eq!(report.outcome(Domain::Memory), Some(DomainOutcome::Unavailable));
    assert_eq!(report.outcome(Domain::Battery), Some(DomainOutcome::Retained));

    let snapshot = scheduler.store().snapshot();
    assert_eq!(snapshot.cpu.usage_percent, None);
    assert!(snapshot.memory.is_none());
    assert!(snapshot.disk.volume.is_none());
    assert_eq!(snapshot.gpu.refresh_rate_hz, None);
    assert_eq!(snapshot.network.public_ip, UNRESOLVED);
    assert!(scheduler.store().history().cpu_usage.is_empty());
}

#[test]
fn test_cpu_usage_from_second_sample() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();

    host.state
        .lock()
        .set_ticks(&[(150, 50, 900, 0), (100, 50, 950, 0)]);
    scheduler.tick();

    let usage = scheduler.store().snapshot().cpu.usage_percent.unwrap();
    assert!((usage - 25.0).abs() < 1e-3, "usage {}", usage);
    let history: Vec<f32> = scheduler.store().history().cpu_usage.iter().copied().collect();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], 0.0);
    assert_eq!(*history.last().unwrap(), usage);
}

#[test]
fn test_history_follows_values_and_stays_bounded() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    for _ in 0..3 {
        scheduler.tick();
    }
    let history = scheduler.store().history();
    assert_eq!(history.cpu_usage.len(), 3);
    assert_eq!(history.network_in.len(), 3);
    // memory runs on ticks 1 and 2
    assert_eq!(history.memory_usage.len(), 2);
    assert_eq!(
        history.memory_usage.latest().copied(),
        scheduler.store().snapshot().memory.as_ref().map(|m| m.usage_percent)
    );

    for _ in 0..200 {
        scheduler.tick();
    }
    let history = scheduler.store().history();
    assert_eq!(history.cpu_usage.len(), DEFAULT_HISTORY_SIZE);
    assert_eq!(history.memory_usage.len(), DEFAULT_HISTORY_SIZE);
    assert_eq!(history.network_out.len(), DEFAULT_HISTORY_SIZE);
}

#[test]
fn test_missing_battery_keeps_previous_fields() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();
    assert_eq!(scheduler.store().snapshot().battery.level_percent, Some(80.0));

    host.state.lock().battery = None;
    while scheduler.counter() < 10 {
        scheduler.tick();
    }

    let battery = &scheduler.store().snapshot().battery;
    assert!(!battery.present);
    assert_eq!(battery.level_percent, Some(80.0));
    assert_eq!(battery.time_remaining_minutes, Some(240));
}

#[test]
fn test_zero_capacity_volume_is_retained() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();

    host.state.lock().volume = Some(vitalstat::core::telemetry::VolumeReading {
        name: "overlay".into(),
        total_bytes: 0,
        available_bytes: 0,
    });
    while scheduler.counter() < 29 {
        scheduler.tick();
    }
    let report = scheduler.tick();
    assert_eq!(report.outcome(Domain::Disk), Some(DomainOutcome::Retained));
    let volume = scheduler.store().snapshot().disk.volume.clone().unwrap();
    assert_eq!(volume.name, "nvme0n1p2");
    assert_eq!(volume.usage_percent, 75.0);
}

#[test]
fn test_variable_refresh_rate_reads_nominal() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();
    assert_eq!(scheduler.store().snapshot().gpu.refresh_rate_hz, Some(120));

    host.state.lock().refresh_rate = Some(60);
    scheduler.tick();
    assert_eq!(scheduler.store().snapshot().gpu.refresh_rate_hz, Some(60));
}

#[test]
fn test_power_falls_back_to_energy_rate() {
    let host = FakeHost::populated();
    let mut scheduler = scheduler_with(&host);
    scheduler.tick();
    assert_eq!(scheduler.store().snapshot().power.watts, Some(9.0));
    assert_eq!(scheduler.store().snapshot().cpu.frequency_mhz, Some(2400));
}

fn wait_for_public_ip(scheduler: &mut TieredScheduler) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        scheduler.collect_public_ip();
        let ip = scheduler.store().snapshot().network.public_ip.clone();
        if ip != FETCHING {
            return ip;
        }
        thread::sleep(Duration::from_millis(10));
    }
    FETCHING.to_string()
}

#[test]
fn test_public_ip_is_fetched_once_in_background() {
    let host = FakeHost::populated();
    let probes = Probes::new(Box::new(host.clone())).with_public_ip(Box::new(FixedIp("198.51.100.4")));
    let mut scheduler = TieredScheduler::new(probes);
    assert_eq!(scheduler.store().snapshot().network.public_ip, FETCHING);

    let report = scheduler.tick();
    assert_eq!(report.outcome(Domain::PublicIp), Some(DomainOutcome::Updated));
    assert_eq!(wait_for_public_ip(&mut scheduler), "198.51.100.4");

    while scheduler.counter() < 29 {
        scheduler.tick();
    }
    let report = scheduler.tick();
    assert_eq!(report.outcome(Domain::PublicIp), Some(DomainOutcome::Retained));
}

#[test]
fn test_public_ip_failure_becomes_placeholder() {
    let probes = Probes::new(Box::new(FakeHost::populated())).with_public_ip(Box::new(OfflineIp));
    let mut scheduler = TieredScheduler::new(probes);
    scheduler.tick();
    assert_eq!(wait_for_public_ip(&mut scheduler), UNRESOLVED);
}
