//! Pure pricing rules: demand surge, occupancy tiers and the holiday calendar.
//!
//! Nothing in here does I/O.

mod holidays;
mod occupancy;
mod surge;

pub use holidays::{HolidayCalendar, StaticHolidays};
pub use occupancy::{occupancy_multiplier, occupancy_rate};
pub use surge::{NIGHT_SURCHARGE, is_night_hour, night_adjusted, surge_multiplier};

/// Extra multiplier on days listed in the holiday calendar.
pub const HOLIDAY_BOOST: f64 = 1.1;

/// Rounds half away from zero to two decimals, the precision prices are
/// stored with. The nudge keeps products like `1.25 * 1.15`, which land a
/// hair below the half-way point in binary, rounding the decimal way.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    (scaled + scaled.signum() * 1e-9).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.4375), 1.44);
        assert_eq!(round2(1250.0), 1250.0);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(99.994), 99.99);
        assert_eq!(round2(1.25 * 1.15), 1.44);
        assert_eq!(round2(-2.345), -2.35);
        assert_eq!(round2(0.0), 0.0);
    }
}
