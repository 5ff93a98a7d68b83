//! Platform-agnostic types for drone battery tracking.
//!
//! This crate provides the shared value types used by the pure compute core
//! (skyfuel-core), the persistence layer (skyfuel-store), and the CLI.
//!
//! # Features
//!
//! - Battery value type with a validating builder
//! - Closed chemistry and lifecycle-status enumerations
//! - Per-chemistry degradation coefficients and cycle ceilings
//! - Error types for validation
//!
//! # Example
//!
//! ```
//! use skyfuel_types::{Battery, BatteryStatus, BatteryType};
//! use time::macros::date;
//!
//! let battery = Battery::builder()
//!     .brand("Tattu")
//!     .model("R-Line 1550")
//!     .serial_number("TA-001")
//!     .battery_type(BatteryType::Lipo)
//!     .cells(4)
//!     .capacity_mah(1550)
//!     .purchase_date(date!(2024 - 03 - 01))
//!     .status(BatteryStatus::Charged)
//!     .try_build()?;
//!
//! assert_eq!(battery.battery_type.recommended_max_cycles(), 300);
//! # Ok::<(), skyfuel_types::ParseError>(())
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{Battery, BatteryBuilder, BatteryStatus, BatteryType};
