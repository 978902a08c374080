/// Used when no battery voltage can be resolved
pub const NOMINAL_VOLTAGE: f64 = 12.0;

/// Draw in watts from battery current, else the battery's own energy rate
pub fn watts(current_ma: Option<f64>, voltage: Option<f64>, energy_rate: Option<f32>) -> Option<f32> {
    match current_ma {
        Some(ma) => {
            let volts = voltage.unwrap_or(NOMINAL_VOLTAGE);
            Some((ma / 1000.0 * volts).abs() as f32)
        }
        None => energy_rate.map(f32::abs),
    }
}
