use std::time::{Duration, Instant};

use vitalstat::core::telemetry::{
    AddressRecord, InterfaceCounters, NetworkInterfaceRegistry, Probes, TieredScheduler,
};

use super::fakes::FakeHost;

fn counters(entries: &[(&str, u64, u64)]) -> Vec<InterfaceCounters> {
    entries
        .iter()
        .map(|&(name, rx, tx)| InterfaceCounters::new(name, rx, tx))
        .collect()
}

#[test]
fn test_en0_wins_over_lexicographic_order() {
    let mut registry = NetworkInterfaceRegistry::new();
    registry.update(
        &counters(&[("utun3", 200, 100), ("en0", 1000, 800)]),
        &[],
        Instant::now(),
    );

    assert_eq!(registry.selected_index(), 0);
    assert_eq!(registry.selected().map(|(name, _)| name), Some("en0"));
    assert_eq!(registry.names(), ["en0".to_string(), "utun3".to_string()]);
    assert_eq!(registry.totals(), (1200, 900));
}

#[test]
fn test_en_prefix_beats_other_names() {
    let mut registry = NetworkInterfaceRegistry::new();
    registry.update(
        &counters(&[("awdl0", 5, 5), ("en7", 5, 5), ("bridge0", 5, 5)]),
        &[],
        Instant::now(),
    );
    assert_eq!(registry.selected().map(|(name, _)| name), Some("en7"));
}

#[test]
fn test_speed_from_delta_over_elapsed() {
    let start = Instant::now();
    let mut registry = NetworkInterfaceRegistry::new();
    registry.update(&counters(&[("en0", 1000, 1000)]), &[], start);
    registry.update(
        &counters(&[("en0", 5000, 3000)]),
        &[],
        start + Duration::from_secs(2),
    );

    let state = registry.get("en0").unwrap();
    assert_eq!(state.speed_in, 2000.0);
    assert_eq!(state.speed_out, 1000.0);
}

#[test]
fn test_counter_reset_never_goes_negative() {
    let start = Instant::now();
    let mut registry = NetworkInterfaceRegistry::new();
    registry.update(&counters(&[("en0", 90_000, 70_000)]), &[], start);
    registry.update(
        &counters(&[("en0", 100, 50)]),
        &[],
        start + Duration::from_secs(1),
    );

    let state = registry.get("en0").unwrap();
    assert_eq!(state.speed_in, 0.0);
    assert_eq!(state.speed_out, 0.0);
    assert_eq!(state.bytes_in, 100);

    registry.update(
        &counters(&[("en0", 600, 50)]),
        &[],
        start + Duration::from_secs(2),
    );
    assert_eq!(registry.get("en0").unwrap().speed_in, 500.0);
}

#[test]
fn test_selection_clamped_when_interfaces_disappear() {
    let now = Instant::now();
    let mut registry = NetworkInterfaceRegistry::new();
    registry.update(
        &counters(&[("en0", 1, 1), ("en1", 1, 1), ("utun0", 1, 1)]),
        &[],
        now,
    );
    registry.select_next();
    registry.select_next();
    assert_eq!(registry.selected_index(), 2);

    registry.update(&counters(&[("en0", 2, 2)]), &[], now + Duration::from_secs(1));
    assert_eq!(registry.len(), 1);
    assert!(registry.selected_index() < registry.len());
    assert_eq!(registry.selected().map(|(name, _)| name), Some("en0"));
    assert!(registry.get("utun0").is_none());
}

#[test]
fn test_idle_interface_is_pruned() {
    let now = Instant::now();
    let mut registry = NetworkInterfaceRegistry::new();
    registry.update(&counters(&[("en0", 10, 10), ("en1", 10, 10)]), &[], now);
    registry.update(
        &counters(&[("en0", 20, 20), ("en1", 0, 0)]),
        &[],
        now + Duration::from_secs(1),
    );
    assert_eq!(registry.names(), ["en0".to_string()]);
}

#[test]
fn test_interface_cycling_updates_snapshot_immediately() {
    let host = FakeHost::populated();
    host.state.lock().addresses = vec![
        AddressRecord {
            interface: "en0".into(),
            addr: "192.168.1.7".parse().unwrap(),
        },
        AddressRecord {
            interface: "utun3".into(),
            addr: "10.8.0.2".parse().unwrap(),
        },
    ];
    let mut scheduler = TieredScheduler::new(Probes::new(Box::new(host.clone())));
    scheduler.tick();

    let network = &scheduler.store().snapshot().network;
    assert_eq!(network.selected_interface.as_deref(), Some("en0"));
    assert_eq!(network.local_ip.as_deref(), Some("192.168.1.7"));
    assert_eq!(network.interfaces[0].display_name, "Wi-Fi");
    assert_eq!(network.total_in_bytes, 1200);

    assert!(scheduler.select_next_interface());
    let network = &scheduler.store().snapshot().network;
    assert_eq!(network.selected_interface.as_deref(), Some("utun3"));
    assert_eq!(network.local_ip.as_deref(), Some("10.8.0.2"));

    assert!(!scheduler.select_next_interface());
    assert!(scheduler.select_previous_interface());
    assert!(!scheduler.select_previous_interface());
    assert_eq!(
        scheduler.store().snapshot().network.selected_interface.as_deref(),
        Some("en0")
    );
}
