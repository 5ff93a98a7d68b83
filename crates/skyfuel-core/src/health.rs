//! Battery health model.
//!
//! Health is a 0-100 score derived from chemistry, calendar age, and charge
//! cycle count. The model is a linear combination of two penalties:
//!
//! - cycle impact: `cycle_count * cycle_factor(chemistry)`
//! - age impact: `age_in_years * age_factor(chemistry)`
//!
//! `health = 100 - (cycle_impact + age_impact)`, truncated toward zero and
//! clamped to `[0, 100]`. For a fixed chemistry the score is monotonically
//! non-increasing in both cycle count and age.
//!
//! # Example
//!
//! ```
//! use skyfuel_core::health_percentage;
//! use skyfuel_types::{Battery, BatteryType};
//! use time::macros::date;
//!
//! let battery = Battery::builder()
//!     .serial_number("SN001")
//!     .battery_type(BatteryType::Lipo)
//!     .cells(4)
//!     .capacity_mah(1550)
//!     .purchase_date(date!(2023 - 01 - 01))
//!     .cycle_count(100)
//!     .try_build()
//!     .unwrap();
//!
//! // One year (365 days) and 100 cycles: 100 - (100 * 0.25 + 1 * 10) = 65
//! assert_eq!(health_percentage(&battery, date!(2024 - 01 - 01)), 65);
//! ```

use time::Date;

use skyfuel_types::{Battery, BatteryStatus};

/// Days a discharged battery may rest before a charge reminder fires.
pub const CHARGE_REMINDER_DAYS: i64 = 7;

/// Calendar age of a battery in whole days.
///
/// Clamped at zero so a future-dated purchase date cannot produce a negative
/// age (and through it a health score above 100).
#[must_use]
pub fn age_in_days(battery: &Battery, today: Date) -> i64 {
    (today - battery.purchase_date).whole_days().max(0)
}

/// Estimated remaining health as a percentage in `[0, 100]`.
///
/// Truncates toward zero before clamping, so fractional penalties round in
/// the battery's favor.
#[must_use]
pub fn health_percentage(battery: &Battery, today: Date) -> u8 {
    let cycle_impact = f64::from(battery.cycle_count) * battery.battery_type.cycle_factor();
    let age_in_years = age_in_days(battery, today) as f64 / 365.0;
    let age_impact = age_in_years * battery.battery_type.age_factor_per_year();

    let health = 100.0 - (cycle_impact + age_impact);
    (health as i64).clamp(0, 100) as u8
}

/// Whether a discharged battery has rested long enough to need a recharge.
///
/// True iff the battery is [`BatteryStatus::Discharged`], its last use date
/// is known, and more than [`CHARGE_REMINDER_DAYS`] days have passed since.
/// An unknown last use date never raises the reminder: with no way to tell
/// how long the battery has rested, staying silent is the conservative
/// default.
#[must_use]
pub fn should_be_charged(battery: &Battery, today: Date) -> bool {
    battery.status == BatteryStatus::Discharged
        && battery
            .last_use_date
            .is_some_and(|last_use| (today - last_use).whole_days() > CHARGE_REMINDER_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfuel_types::BatteryType;
    use time::macros::date;

    fn battery(ty: BatteryType, cycles: u32) -> Battery {
        Battery::builder()
            .serial_number("SN001")
            .battery_type(ty)
            .cells(4)
            .capacity_mah(1500)
            .purchase_date(date!(2024 - 01 - 01))
            .cycle_count(cycles)
            .try_build()
            .unwrap()
    }

    #[test]
    fn test_new_battery_is_at_full_health() {
        for ty in [
            BatteryType::Lipo,
            BatteryType::LiIon,
            BatteryType::Nimh,
            BatteryType::Life,
            BatteryType::Other,
        ] {
            assert_eq!(health_percentage(&battery(ty, 0), date!(2024 - 01 - 01)), 100);
        }
    }

    #[test]
    fn test_lipo_one_year_hundred_cycles() {
        // 365 days: 100 - (100 * 0.25 + 1 * 10) = 65
        let mut b = battery(BatteryType::Lipo, 100);
        b.purchase_date = date!(2023 - 01 - 01);
        assert_eq!(health_percentage(&b, date!(2024 - 01 - 01)), 65);
    }

    #[test]
    fn test_li_ion_one_year_hundred_cycles() {
        // 365 days: 100 - (100 * 0.15 + 1 * 7) = 78
        let mut b = battery(BatteryType::LiIon, 100);
        b.purchase_date = date!(2023 - 01 - 01);
        assert_eq!(health_percentage(&b, date!(2024 - 01 - 01)), 78);
    }

    #[test]
    fn test_leap_year_span_costs_an_extra_day() {
        // 2024 is a leap year, so Jan 1 to Jan 1 spans 366 days: the age
        // penalty crosses the next whole percent and health lands at 64
        let b = battery(BatteryType::Lipo, 100);
        assert_eq!(health_percentage(&b, date!(2025 - 01 - 01)), 64);
    }

    #[test]
    fn test_health_clamps_at_zero() {
        let b = battery(BatteryType::Lipo, 10_000);
        assert_eq!(health_percentage(&b, date!(2025 - 01 - 01)), 0);
    }

    #[test]
    fn test_future_purchase_date_does_not_exceed_hundred() {
        let b = battery(BatteryType::Lipo, 0);
        assert_eq!(age_in_days(&b, date!(2023 - 01 - 01)), 0);
        assert_eq!(health_percentage(&b, date!(2023 - 01 - 01)), 100);
    }

    #[test]
    fn test_lipo_degrades_faster_than_life() {
        let today = date!(2025 - 06 - 01);
        for cycles in [0, 50, 150, 400] {
            let lipo = health_percentage(&battery(BatteryType::Lipo, cycles), today);
            let life = health_percentage(&battery(BatteryType::Life, cycles), today);
            assert!(lipo <= life, "lipo {lipo} > life {life} at {cycles} cycles");
        }
    }

    #[test]
    fn test_age_in_days_truncates_whole_days() {
        let b = battery(BatteryType::Lipo, 0);
        assert_eq!(age_in_days(&b, date!(2024 - 01 - 01)), 0);
        assert_eq!(age_in_days(&b, date!(2024 - 01 - 02)), 1);
        assert_eq!(age_in_days(&b, date!(2025 - 01 - 01)), 366); // 2024 is a leap year
    }

    #[test]
    fn test_should_be_charged_requires_discharged_status() {
        let today = date!(2024 - 06 - 01);
        let mut b = battery(BatteryType::Lipo, 10);
        b.last_use_date = Some(date!(2024 - 05 - 01));

        b.status = BatteryStatus::Charged;
        assert!(!should_be_charged(&b, today));
        b.status = BatteryStatus::Storage;
        assert!(!should_be_charged(&b, today));
        b.status = BatteryStatus::Discharged;
        assert!(should_be_charged(&b, today));
    }

    #[test]
    fn test_should_be_charged_without_last_use_date() {
        let mut b = battery(BatteryType::Lipo, 10);
        b.status = BatteryStatus::Discharged;
        assert!(!should_be_charged(&b, date!(2024 - 06 - 01)));
    }

    #[test]
    fn test_should_be_charged_seven_day_boundary() {
        let mut b = battery(BatteryType::Lipo, 10);
        b.status = BatteryStatus::Discharged;
        b.last_use_date = Some(date!(2024 - 06 - 01));

        // Exactly 7 days is still fine, 8 is overdue
        assert!(!should_be_charged(&b, date!(2024 - 06 - 08)));
        assert!(should_be_charged(&b, date!(2024 - 06 - 09)));
    }
}
