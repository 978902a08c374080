use crate::core::telemetry::probe::CoreTicks;

/// Processor usage across all cores, in percent.
///
/// Returns 0 when there is no previous vector. Cores missing from
/// `previous` (the count changed) contribute nothing, and the sum is
/// averaged over the cores present in `current`.
pub fn usage_percent(previous: Option<&[CoreTicks]>, current: &[CoreTicks]) -> f32 {
    let Some(previous) = previous else {
        return 0.0;
    };
    if current.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0f64;
    for (index, now) in current.iter().enumerate() {
        let Some(before) = previous.get(index) else {
            continue;
        };

        let user = now.user.saturating_sub(before.user);
        let system = now.system.saturating_sub(before.system);
        let idle = now.idle.saturating_sub(before.idle);
        let nice = now.nice.saturating_sub(before.nice);

        let busy = user + system + nice;
        let total = busy + idle;
        if total > 0 {
            sum += busy as f64 / total as f64 * 100.0;
        }
    }

    ((sum / current.len() as f64) as f32).clamp(0.0, 100.0)
}
