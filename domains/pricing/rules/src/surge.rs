use crate::round2;

/// Multiplier applied at night, on top of the surge tier.
pub const NIGHT_SURCHARGE: f64 = 1.15;

/// Maps recent search volume against available inventory to a price
/// multiplier.
///
/// No inventory at all is the maximum surge. Otherwise the ratio
/// `recent_requests / available_units` picks a tier.
pub fn surge_multiplier(recent_requests: usize, available_units: i64) -> f64 {
    if available_units == 0 {
        return 2.0;
    }
    let available = available_units.max(1) as f64;
    let ratio = recent_requests as f64 / available;

    match ratio {
        r if r < 1.0 => 1.0,
        r if r < 2.0 => 1.1,
        r if r < 3.0 => 1.25,
        r if r < 5.0 => 1.5,
        _ => 2.0,
    }
}

/// Night is `[21, 24) ∪ [0, 4)` local time.
pub fn is_night_hour(hour: u32) -> bool { hour >= 21 || hour < 4 }

pub fn night_adjusted(multiplier: f64, hour: u32) -> f64 {
    if is_night_hour(hour) {
        round2(multiplier * NIGHT_SURCHARGE)
    }
    else {
        multiplier
    }
}
