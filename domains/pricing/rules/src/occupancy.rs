/// `booked / possible`, or 0 when nothing was possible.
pub fn occupancy_rate(booked_unit_nights: i64, possible_unit_nights: i64) -> f64 {
    if possible_unit_nights > 0 {
        booked_unit_nights as f64 / possible_unit_nights as f64
    }
    else {
        0.0
    }
}

pub fn occupancy_multiplier(occupancy_rate: f64) -> f64 {
    if occupancy_rate >= 0.8 {
        1.25
    }
    else if occupancy_rate >= 0.6 {
        1.15
    }
    else if occupancy_rate >= 0.4 {
        1.05
    }
    else {
        1.0
    }
}
