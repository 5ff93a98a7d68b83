//! Query builder for stored batteries.
//!
//! [`BatteryQuery`] follows the builder pattern for ergonomic filter
//! construction.
//!
//! # Example
//!
//! ```
//! use skyfuel_store::{BatteryQuery, Store};
//! use skyfuel_types::BatteryStatus;
//!
//! let store = Store::open_in_memory()?;
//!
//! // Discharged batteries, most recently updated first
//! let query = BatteryQuery::new()
//!     .status(BatteryStatus::Discharged)
//!     .limit(20);
//! let batteries = store.list_batteries(&query)?;
//! # Ok::<(), skyfuel_store::Error>(())
//! ```

use skyfuel_types::{BatteryStatus, BatteryType};

/// Fluent query builder for batteries.
///
/// All filters are optional and can be chained in any order. By default,
/// results are ordered by `updated_at` descending (most recently touched
/// first).
#[derive(Debug, Default, Clone)]
pub struct BatteryQuery {
    /// Filter by lifecycle status.
    pub status: Option<BatteryStatus>,
    /// Filter by chemistry.
    pub battery_type: Option<BatteryType>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Order by updated_at descending.
    pub newest_first: bool,
}

impl BatteryQuery {
    /// Create a new query with default settings: no filters, no limit,
    /// newest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Only include batteries with the given status.
    pub fn status(mut self, status: BatteryStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Only include batteries with the given chemistry.
    pub fn battery_type(mut self, battery_type: BatteryType) -> Self {
        self.battery_type = Some(battery_type);
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` results.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Order oldest first instead of the default newest first.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = BatteryQuery::new();
        assert!(q.status.is_none());
        assert!(q.battery_type.is_none());
        assert!(q.limit.is_none());
        assert!(q.newest_first);
    }

    #[test]
    fn test_builder_chaining() {
        let q = BatteryQuery::new()
            .status(BatteryStatus::Discharged)
            .battery_type(BatteryType::Lipo)
            .limit(10)
            .offset(20)
            .oldest_first();

        assert_eq!(q.status, Some(BatteryStatus::Discharged));
        assert_eq!(q.battery_type, Some(BatteryType::Lipo));
        assert_eq!(q.limit, Some(10));
        assert_eq!(q.offset, Some(20));
        assert!(!q.newest_first);
    }
}
