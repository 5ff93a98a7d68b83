//! Local data persistence for the drone battery inventory.
//!
//! This crate provides SQLite-based storage for batteries, exposing the
//! repository capability set the rest of the system builds on: get, list,
//! upsert, delete, plus status transitions with cycle accounting and
//! JSON/CSV import/export keyed on serial numbers.
//!
//! # Features
//!
//! - Battery inventory with serial-number deduplication
//! - Status transition history with charge cycle accounting
//! - Query by status/chemistry with pagination
//! - JSON and CSV export, merging import
//!
//! # Example
//!
//! ```no_run
//! use skyfuel_store::{BatteryQuery, Store};
//! use skyfuel_types::BatteryStatus;
//!
//! let store = Store::open_default()?;
//!
//! // Discharged batteries, most recently touched first
//! let query = BatteryQuery::new()
//!     .status(BatteryStatus::Discharged)
//!     .limit(10);
//! let batteries = store.list_batteries(&query)?;
//! # Ok::<(), skyfuel_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{ImportResult, StatusEvent, StoredBattery};
pub use queries::BatteryQuery;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/skyfuel/data.db`
/// - macOS: `~/Library/Application Support/skyfuel/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\skyfuel\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("skyfuel")
        .join("data.db")
}
