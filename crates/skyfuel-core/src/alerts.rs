//! Alert rules over battery state.
//!
//! Four independent rules are evaluated against a battery snapshot; each
//! produces at most one [`BatteryAlert`]. Alerts are ephemeral: computed
//! fresh on every evaluation, handed to a notification or display layer,
//! never stored or mutated.
//!
//! # Example
//!
//! ```
//! use skyfuel_core::check_battery_alerts;
//! use skyfuel_types::{Battery, BatteryStatus, BatteryType};
//! use time::macros::date;
//!
//! let battery = Battery::builder()
//!     .serial_number("SN001")
//!     .battery_type(BatteryType::Lipo)
//!     .cells(4)
//!     .capacity_mah(1550)
//!     .purchase_date(date!(2024 - 01 - 01))
//!     .status(BatteryStatus::Discharged)
//!     .last_use_date(date!(2024 - 05 - 01))
//!     .try_build()
//!     .unwrap();
//!
//! let alerts = check_battery_alerts(&battery, date!(2024 - 05 - 11));
//! assert!(alerts.iter().any(|a| a.kind == skyfuel_core::AlertKind::NeedsCharging));
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

use skyfuel_types::Battery;

use crate::health::{CHARGE_REMINDER_DAYS, age_in_days, health_percentage, should_be_charged};

/// Days of rest after which a charge reminder escalates from Medium to High.
pub const CHARGE_URGENT_DAYS: i64 = 14;

/// Health percentage at or below which the low-health rule fires.
pub const LOW_HEALTH_THRESHOLD: u8 = 20;

/// Days since last charge (or purchase) after which maintenance is due.
pub const MAINTENANCE_INTERVAL_DAYS: i64 = 90;

/// Cycle multiple at which periodic maintenance is due.
pub const MAINTENANCE_CYCLE_INTERVAL: u32 = 50;

/// What a [`BatteryAlert`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Discharged battery resting longer than the reminder window.
    NeedsCharging,
    /// Health score at or below [`LOW_HEALTH_THRESHOLD`].
    LowHealth,
    /// Periodic maintenance interval reached, by calendar or by cycles.
    MaintenanceDue,
    /// Cycle count approaching or past the chemistry's recommended ceiling.
    HighCycleCount,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::NeedsCharging => write!(f, "Needs charging"),
            AlertKind::LowHealth => write!(f, "Low health"),
            AlertKind::MaintenanceDue => write!(f, "Maintenance due"),
            AlertKind::HighCycleCount => write!(f, "High cycle count"),
        }
    }
}

/// Alert priority.
///
/// # Ordering
///
/// Priorities are ordered by severity: `Low < Medium < High < Critical`,
/// which is what [`check_all_batteries_alerts`] sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertPriority {
    /// Routine, act whenever convenient.
    Low,
    /// Worth attention soon.
    Medium,
    /// Act before the next flight.
    High,
    /// Battery at risk of damage or unsafe to fly.
    Critical,
}

impl fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertPriority::Low => write!(f, "Low"),
            AlertPriority::Medium => write!(f, "Medium"),
            AlertPriority::High => write!(f, "High"),
            AlertPriority::Critical => write!(f, "Critical"),
        }
    }
}

/// A single alert produced for a battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryAlert {
    /// Rule that fired.
    pub kind: AlertKind,
    /// Severity of the alert.
    pub priority: AlertPriority,
    /// Short human-readable title.
    pub title: String,
    /// Human-readable detail message.
    pub message: String,
}

fn battery_label(battery: &Battery) -> String {
    let name = format!("{} {}", battery.brand, battery.model);
    let name = name.trim();
    if name.is_empty() {
        battery.serial_number.clone()
    } else {
        format!("{} ({})", name, battery.serial_number)
    }
}

/// Evaluate every alert rule against one battery.
///
/// Rules are independent; zero to four alerts come back, in no particular
/// order. The evaluator never fails for valid field values: an absent
/// optional date simply keeps its dependent rule quiet.
#[must_use]
pub fn check_battery_alerts(battery: &Battery, today: Date) -> Vec<BatteryAlert> {
    let mut alerts = Vec::new();
    let label = battery_label(battery);

    // Rule 1: discharged battery left to rest.
    if should_be_charged(battery, today) {
        // should_be_charged guarantees last_use_date is present
        let days_since_use = battery
            .last_use_date
            .map(|d| (today - d).whole_days())
            .unwrap_or_default();
        let priority = if days_since_use > CHARGE_URGENT_DAYS {
            AlertPriority::High
        } else {
            AlertPriority::Medium
        };
        alerts.push(BatteryAlert {
            kind: AlertKind::NeedsCharging,
            priority,
            title: "Battery needs charging".to_string(),
            message: format!("{label} has been discharged for {days_since_use} days"),
        });
    }

    // Rule 2: health score at or below the floor.
    let health = health_percentage(battery, today);
    if health <= LOW_HEALTH_THRESHOLD {
        let priority = if health < 10 {
            AlertPriority::Critical
        } else if health < 15 {
            AlertPriority::High
        } else {
            AlertPriority::Medium
        };
        alerts.push(BatteryAlert {
            kind: AlertKind::LowHealth,
            priority,
            title: "Battery health is low".to_string(),
            message: format!("{label} is down to {health}% estimated health"),
        });
    }

    // Rule 3: periodic maintenance, by calendar or by cycle multiples.
    let reference = battery.last_charge_date.unwrap_or(battery.purchase_date);
    let days_since_maintenance = (today - reference).whole_days();
    let cycle_milestone =
        battery.cycle_count > 0 && battery.cycle_count % MAINTENANCE_CYCLE_INTERVAL == 0;
    if days_since_maintenance >= MAINTENANCE_INTERVAL_DAYS || cycle_milestone {
        alerts.push(BatteryAlert {
            kind: AlertKind::MaintenanceDue,
            priority: AlertPriority::Low,
            title: "Maintenance due".to_string(),
            message: format!(
                "{label} is due for a maintenance check ({} cycles, last charge {} days ago)",
                battery.cycle_count, days_since_maintenance
            ),
        });
    }

    // Rule 4: cycle count against the chemistry's recommended ceiling.
    let max_cycles = battery.battery_type.recommended_max_cycles();
    let cycles = f64::from(battery.cycle_count);
    if cycles >= 0.8 * f64::from(max_cycles) {
        let priority = if cycles > 1.2 * f64::from(max_cycles) {
            AlertPriority::High
        } else if cycles > f64::from(max_cycles) {
            AlertPriority::Medium
        } else {
            AlertPriority::Low
        };
        alerts.push(BatteryAlert {
            kind: AlertKind::HighCycleCount,
            priority,
            title: "High cycle count".to_string(),
            message: format!(
                "{label} has {} of {} recommended cycles",
                battery.cycle_count, max_cycles
            ),
        });
    }

    alerts
}

/// Evaluate alert rules across a whole collection of batteries.
///
/// Results are sorted by priority descending (Critical first); ties are
/// unordered.
#[must_use]
pub fn check_all_batteries_alerts(batteries: &[Battery], today: Date) -> Vec<BatteryAlert> {
    let mut alerts: Vec<BatteryAlert> = batteries
        .iter()
        .flat_map(|battery| check_battery_alerts(battery, today))
        .collect();

    alerts.sort_by(|a, b| b.priority.cmp(&a.priority));
    alerts
}

/// How long a discharged battery has rested, if that can be determined.
///
/// Exposed for display layers that want the raw figure the needs-charging
/// rule is based on.
#[must_use]
pub fn days_since_use(battery: &Battery, today: Date) -> Option<i64> {
    battery.last_use_date.map(|d| (today - d).whole_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfuel_types::{BatteryStatus, BatteryType};
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 01);

    fn fresh_battery() -> Battery {
        Battery::builder()
            .brand("Tattu")
            .model("R-Line")
            .serial_number("SN001")
            .battery_type(BatteryType::Lipo)
            .cells(4)
            .capacity_mah(1500)
            .purchase_date(TODAY)
            .status(BatteryStatus::Charged)
            .last_charge_date(TODAY)
            .try_build()
            .unwrap()
    }

    #[test]
    fn test_fresh_battery_has_no_alerts() {
        assert!(check_battery_alerts(&fresh_battery(), TODAY).is_empty());
    }

    #[test]
    fn test_needs_charging_medium_within_two_weeks() {
        let mut b = fresh_battery();
        b.status = BatteryStatus::Discharged;
        b.last_use_date = Some(TODAY - time::Duration::days(10));

        let alerts = check_battery_alerts(&b, TODAY);
        let alert = alerts
            .iter()
            .find(|a| a.kind == AlertKind::NeedsCharging)
            .unwrap();
        assert_eq!(alert.priority, AlertPriority::Medium);
        assert!(alert.message.contains("10 days"));
    }

    #[test]
    fn test_needs_charging_escalates_after_two_weeks() {
        let mut b = fresh_battery();
        b.status = BatteryStatus::Discharged;
        b.last_use_date = Some(TODAY - time::Duration::days(15));

        let alerts = check_battery_alerts(&b, TODAY);
        let alert = alerts
            .iter()
            .find(|a| a.kind == AlertKind::NeedsCharging)
            .unwrap();
        assert_eq!(alert.priority, AlertPriority::High);
    }

    #[test]
    fn test_needs_charging_silent_without_last_use_date() {
        let mut b = fresh_battery();
        b.status = BatteryStatus::Discharged;
        b.last_use_date = None;

        let alerts = check_battery_alerts(&b, TODAY);
        assert!(alerts.iter().all(|a| a.kind != AlertKind::NeedsCharging));
    }

    #[test]
    fn test_low_health_priorities() {
        // Lipo with purchase date today: health = 100 - cycles * 0.25.
        // 324 cycles -> 19 (Medium), 348 -> 13 (High), 368 -> 8 (Critical).
        let cases = [
            (324, AlertPriority::Medium),
            (348, AlertPriority::High),
            (368, AlertPriority::Critical),
        ];
        for (cycles, expected) in cases {
            let mut b = fresh_battery();
            b.cycle_count = cycles;
            let alerts = check_battery_alerts(&b, TODAY);
            let alert = alerts
                .iter()
                .find(|a| a.kind == AlertKind::LowHealth)
                .unwrap_or_else(|| panic!("no low-health alert at {cycles} cycles"));
            assert_eq!(alert.priority, expected, "at {cycles} cycles");
        }
    }

    #[test]
    fn test_maintenance_due_by_calendar() {
        let mut b = fresh_battery();
        b.last_charge_date = Some(TODAY - time::Duration::days(90));

        let alerts = check_battery_alerts(&b, TODAY);
        let alert = alerts
            .iter()
            .find(|a| a.kind == AlertKind::MaintenanceDue)
            .unwrap();
        assert_eq!(alert.priority, AlertPriority::Low);
    }

    #[test]
    fn test_maintenance_falls_back_to_purchase_date() {
        let mut b = fresh_battery();
        b.purchase_date = TODAY - time::Duration::days(120);
        b.last_charge_date = None;

        let alerts = check_battery_alerts(&b, TODAY);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::MaintenanceDue));
    }

    #[test]
    fn test_maintenance_due_on_cycle_milestone() {
        let mut b = fresh_battery();
        b.cycle_count = 50;

        let alerts = check_battery_alerts(&b, TODAY);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::MaintenanceDue));

        // Zero cycles is not a milestone
        b.cycle_count = 0;
        let alerts = check_battery_alerts(&b, TODAY);
        assert!(alerts.iter().all(|a| a.kind != AlertKind::MaintenanceDue));
    }

    #[test]
    fn test_high_cycle_count_tiers() {
        // Lipo max is 300: 80% = 240, 100% = 300, 120% = 360.
        let cases = [
            (239, None),
            (240, Some(AlertPriority::Low)),
            (300, Some(AlertPriority::Low)),
            (301, Some(AlertPriority::Medium)),
            (360, Some(AlertPriority::Medium)),
            (361, Some(AlertPriority::High)),
        ];
        for (cycles, expected) in cases {
            let mut b = fresh_battery();
            b.cycle_count = cycles;
            let alerts = check_battery_alerts(&b, TODAY);
            let found = alerts
                .iter()
                .find(|a| a.kind == AlertKind::HighCycleCount)
                .map(|a| a.priority);
            assert_eq!(found, expected, "at {cycles} cycles");
        }
    }

    #[test]
    fn test_check_all_sorts_by_priority_descending() {
        let mut tired = fresh_battery();
        tired.serial_number = "SN-TIRED".to_string();
        tired.cycle_count = 368; // Critical low health

        let mut resting = fresh_battery();
        resting.serial_number = "SN-REST".to_string();
        resting.status = BatteryStatus::Discharged;
        resting.last_use_date = Some(TODAY - time::Duration::days(10)); // Medium

        let alerts = check_all_batteries_alerts(&[resting, tired], TODAY);
        assert!(!alerts.is_empty());
        for pair in alerts.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
        assert_eq!(alerts[0].priority, AlertPriority::Critical);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(AlertPriority::Critical > AlertPriority::High);
        assert!(AlertPriority::High > AlertPriority::Medium);
        assert!(AlertPriority::Medium > AlertPriority::Low);
    }
}
