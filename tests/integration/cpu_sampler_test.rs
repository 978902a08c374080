use vitalstat::core::telemetry::samplers::cpu::usage_percent;
use vitalstat::core::telemetry::CoreTicks;

/// Small deterministic generator so the sweep is reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

#[test]
fn test_usage_within_bounds_for_monotonic_ticks() {
    let mut rng = Lcg(42);
    for round in 0..500 {
        let cores = 1 + rng.next(16) as usize;
        let before: Vec<CoreTicks> = (0..cores)
            .map(|_| {
                CoreTicks::new(
                    rng.next(1_000_000),
                    rng.next(1_000_000),
                    rng.next(1_000_000),
                    rng.next(1_000_000),
                )
            })
            .collect();
        let after: Vec<CoreTicks> = before
            .iter()
            .map(|t| {
                CoreTicks::new(
                    t.user + rng.next(500),
                    t.system + rng.next(500),
                    t.idle + rng.next(500),
                    t.nice + rng.next(50),
                )
            })
            .collect();

        let usage = usage_percent(Some(&before), &after);
        assert!((0.0..=100.0).contains(&usage), "round {}: {}", round, usage);
    }
}

#[test]
fn test_first_sample_after_restart_is_zero() {
    let current = vec![CoreTicks::new(9_000, 1_000, 100, 0); 8];
    assert_eq!(usage_percent(None, &current), 0.0);
}

#[test]
fn test_fully_busy_cores() {
    let before = vec![CoreTicks::new(0, 0, 0, 0); 4];
    let after = vec![CoreTicks::new(60, 30, 0, 10); 4];
    assert!((usage_percent(Some(&before), &after) - 100.0).abs() < 1e-4);
}

#[test]
fn test_shrinking_core_count_does_not_panic() {
    let before = vec![CoreTicks::new(0, 0, 0, 0); 8];
    let after = vec![CoreTicks::new(10, 0, 10, 0); 2];
    assert!((usage_percent(Some(&before), &after) - 50.0).abs() < 1e-4);
}

#[test]
fn test_unchanged_ticks_read_idle() {
    let ticks = vec![CoreTicks::new(5, 5, 5, 5); 2];
    assert_eq!(usage_percent(Some(&ticks), &ticks), 0.0);
}
