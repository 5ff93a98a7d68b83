//! Data models for stored data.

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use skyfuel_types::{Battery, BatteryStatus};

pub(crate) const ISO_DATE: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

pub(crate) fn format_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_default()
}

pub(crate) fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text, ISO_DATE).ok()
}

/// A battery stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBattery {
    /// Database row ID.
    pub id: i64,
    /// The battery value itself.
    pub battery: Battery,
    /// When this row was first created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When this row was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// One recorded status transition.
///
/// A transition with `cycle_completed` set is a Discharged → Charged change,
/// the point at which the battery's cycle count was incremented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Database row ID.
    pub id: i64,
    /// Battery this event belongs to.
    pub battery_id: i64,
    /// Status before the change.
    pub from_status: BatteryStatus,
    /// Status after the change.
    pub to_status: BatteryStatus,
    /// When the change was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub changed_at: OffsetDateTime,
    /// Whether this transition completed a charge cycle.
    pub cycle_completed: bool,
}

/// Outcome of an import merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Batteries with previously unseen serial numbers, inserted.
    pub inserted: usize,
    /// Batteries whose serial number already existed, updated in place.
    pub updated: usize,
}
