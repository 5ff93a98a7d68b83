//! Pure compute core for drone battery tracking.
//!
//! Two independent, stateless components:
//!
//! - **Health/alert model** ([`health`], [`alerts`]): derives a 0-100 health
//!   score from chemistry, age, and cycle count, and evaluates four threshold
//!   rules into a prioritized alert list.
//! - **QR payload codec** ([`qr`]): encodes and decodes the `SKYFUEL::`
//!   delimited text format embedded in battery QR labels, including the
//!   battery-share serialization and the legacy `BATTERY_` label format.
//!
//! Both are pure, synchronous functions over immutable inputs: no I/O, no
//! shared state, no clock reads (callers pass `today` / `at` explicitly),
//! safe to call from any number of threads without coordination.

pub mod alerts;
pub mod health;
pub mod qr;

pub use alerts::{
    AlertKind, AlertPriority, BatteryAlert, check_all_batteries_alerts, check_battery_alerts,
    days_since_use,
};
pub use health::{CHARGE_REMINDER_DAYS, age_in_days, health_percentage, should_be_charged};
pub use qr::{
    QrCodeData, QrEntityType, battery_id_from_code, escape_metadata_value, legacy_battery_id,
    unescape_metadata_value,
};
