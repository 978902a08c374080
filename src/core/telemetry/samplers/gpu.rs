/// Substituted when the display reports a variable (zero) rate
pub const NOMINAL_REFRESH_RATE_HZ: u32 = 120;

pub fn refresh_rate(reported_hz: u32) -> u32 {
    if reported_hz > 0 {
        reported_hz
    } else {
        NOMINAL_REFRESH_RATE_HZ
    }
}

pub fn utilization(percent: f32) -> f32 {
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
