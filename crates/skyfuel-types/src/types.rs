//! Core types for drone battery inventory.

use core::fmt;

use time::Date;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Battery chemistry.
///
/// Each chemistry carries its own degradation coefficients and recommended
/// cycle ceiling, exposed through exhaustive-match accessors so adding a
/// variant forces every table to be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BatteryType {
    /// Lithium polymer.
    Lipo,
    /// Lithium ion.
    LiIon,
    /// Nickel-metal hydride.
    Nimh,
    /// Lithium iron phosphate.
    Life,
    /// Anything else.
    Other,
}

impl BatteryType {
    /// Fraction of total life consumed per charge cycle.
    #[must_use]
    pub fn cycle_factor(&self) -> f64 {
        match self {
            BatteryType::Lipo => 0.25,
            BatteryType::LiIon => 0.15,
            BatteryType::Nimh => 0.10,
            BatteryType::Life => 0.05,
            BatteryType::Other => 0.20,
        }
    }

    /// Percentage points of health lost per calendar year, independent of use.
    #[must_use]
    pub fn age_factor_per_year(&self) -> f64 {
        match self {
            BatteryType::Lipo => 10.0,
            BatteryType::LiIon => 7.0,
            BatteryType::Nimh => 5.0,
            BatteryType::Life => 4.0,
            BatteryType::Other => 8.0,
        }
    }

    /// Recommended maximum number of charge cycles for this chemistry.
    #[must_use]
    pub fn recommended_max_cycles(&self) -> u32 {
        match self {
            BatteryType::Lipo => 300,
            BatteryType::LiIon => 500,
            BatteryType::Nimh => 800,
            BatteryType::Life => 1500,
            BatteryType::Other => 400,
        }
    }

    /// The canonical wire name used in QR payloads and exports.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            BatteryType::Lipo => "LIPO",
            BatteryType::LiIon => "LI_ION",
            BatteryType::Nimh => "NIMH",
            BatteryType::Life => "LIFE",
            BatteryType::Other => "OTHER",
        }
    }

    /// Parse a wire name back to a chemistry.
    ///
    /// Unknown names fall back to [`BatteryType::Other`] rather than failing,
    /// so payloads written by newer app versions still scan.
    ///
    /// # Examples
    ///
    /// ```
    /// use skyfuel_types::BatteryType;
    ///
    /// assert_eq!(BatteryType::from_wire_name("LIPO"), BatteryType::Lipo);
    /// assert_eq!(BatteryType::from_wire_name("LI_ION"), BatteryType::LiIon);
    /// assert_eq!(BatteryType::from_wire_name("graphene"), BatteryType::Other);
    /// ```
    #[must_use]
    pub fn from_wire_name(name: &str) -> Self {
        match name {
            "LIPO" => BatteryType::Lipo,
            "LI_ION" => BatteryType::LiIon,
            "NIMH" => BatteryType::Nimh,
            "LIFE" => BatteryType::Life,
            _ => BatteryType::Other,
        }
    }
}

impl Default for BatteryType {
    fn default() -> Self {
        BatteryType::Other
    }
}

impl fmt::Display for BatteryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatteryType::Lipo => write!(f, "LiPo"),
            BatteryType::LiIon => write!(f, "Li-Ion"),
            BatteryType::Nimh => write!(f, "NiMH"),
            BatteryType::Life => write!(f, "LiFe"),
            BatteryType::Other => write!(f, "Other"),
        }
    }
}

/// Lifecycle status of a battery.
///
/// Transitions are unconstrained: any status may follow any other. A
/// Discharged → Charged transition is semantically a completed charge cycle
/// and increments the cycle count, but that side effect belongs to the
/// repository recording the transition, not to this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BatteryStatus {
    /// Fully charged and flight-ready.
    Charged,
    /// Used and awaiting a recharge.
    Discharged,
    /// Held at storage voltage.
    Storage,
    /// Retired or damaged.
    OutOfService,
}

impl BatteryStatus {
    /// The canonical wire name used in QR payloads and exports.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            BatteryStatus::Charged => "CHARGED",
            BatteryStatus::Discharged => "DISCHARGED",
            BatteryStatus::Storage => "STORAGE",
            BatteryStatus::OutOfService => "OUT_OF_SERVICE",
        }
    }

    /// Parse a wire name back to a status.
    ///
    /// Unknown names fall back to [`BatteryStatus::Storage`], the
    /// conservative state for a battery of unknown condition.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Self {
        match name {
            "CHARGED" => BatteryStatus::Charged,
            "DISCHARGED" => BatteryStatus::Discharged,
            "OUT_OF_SERVICE" => BatteryStatus::OutOfService,
            _ => BatteryStatus::Storage,
        }
    }
}

impl Default for BatteryStatus {
    fn default() -> Self {
        BatteryStatus::Storage
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatteryStatus::Charged => write!(f, "Charged"),
            BatteryStatus::Discharged => write!(f, "Discharged"),
            BatteryStatus::Storage => write!(f, "Storage"),
            BatteryStatus::OutOfService => write!(f, "Out of Service"),
        }
    }
}

/// A drone battery.
///
/// Plain value type: identity (brand, model, serial number), technical data
/// (chemistry, cell count, capacity), and lifecycle state (purchase date,
/// status, cycle count, last use/charge dates). The serial number is the
/// natural dedup key used by import and sync merge logic.
///
/// Field invariants (cells and capacity positive, cycle count non-negative by
/// type) are enforced by [`BatteryBuilder::try_build`], not by this type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Battery {
    /// Manufacturer brand.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Serial number, the dedup key for import/merge.
    pub serial_number: String,
    /// Battery chemistry.
    pub battery_type: BatteryType,
    /// Number of cells in series.
    pub cells: u8,
    /// Capacity in mAh.
    pub capacity_mah: u32,
    /// Date of purchase.
    pub purchase_date: Date,
    /// Current lifecycle status.
    pub status: BatteryStatus,
    /// Completed charge cycles.
    pub cycle_count: u32,
    /// Date of last use (last discharge), if known.
    pub last_use_date: Option<Date>,
    /// Date of last charge, if known.
    pub last_charge_date: Option<Date>,
    /// Free-text notes.
    pub notes: String,
}

impl Battery {
    /// Create a builder for constructing a `Battery` with validation.
    pub fn builder() -> BatteryBuilder {
        BatteryBuilder::default()
    }
}

/// Builder for constructing [`Battery`] values.
///
/// Use [`try_build`](Self::try_build) to validate: serial number and purchase
/// date are required, cell count and capacity must be positive.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct BatteryBuilder {
    brand: String,
    model: String,
    serial_number: String,
    battery_type: BatteryType,
    cells: u8,
    capacity_mah: u32,
    purchase_date: Option<Date>,
    status: BatteryStatus,
    cycle_count: u32,
    last_use_date: Option<Date>,
    last_charge_date: Option<Date>,
    notes: String,
}

impl BatteryBuilder {
    /// Set the brand.
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the serial number.
    pub fn serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = serial.into();
        self
    }

    /// Set the chemistry.
    pub fn battery_type(mut self, battery_type: BatteryType) -> Self {
        self.battery_type = battery_type;
        self
    }

    /// Set the cell count.
    pub fn cells(mut self, cells: u8) -> Self {
        self.cells = cells;
        self
    }

    /// Set the capacity in mAh.
    pub fn capacity_mah(mut self, capacity: u32) -> Self {
        self.capacity_mah = capacity;
        self
    }

    /// Set the purchase date.
    pub fn purchase_date(mut self, date: Date) -> Self {
        self.purchase_date = Some(date);
        self
    }

    /// Set the lifecycle status.
    pub fn status(mut self, status: BatteryStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the completed cycle count.
    pub fn cycle_count(mut self, cycles: u32) -> Self {
        self.cycle_count = cycles;
        self
    }

    /// Set the last use date.
    pub fn last_use_date(mut self, date: Date) -> Self {
        self.last_use_date = Some(date);
        self
    }

    /// Set the last charge date.
    pub fn last_charge_date(mut self, date: Date) -> Self {
        self.last_charge_date = Some(date);
        self
    }

    /// Set the free-text notes.
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Build the `Battery` with validation.
    ///
    /// Validates:
    /// - serial number is non-empty
    /// - purchase date is set
    /// - `cells` is at least 1
    /// - `capacity_mah` is at least 1
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingField`] or [`ParseError::InvalidValue`]
    /// if any requirement is not met.
    pub fn try_build(self) -> Result<Battery, ParseError> {
        if self.serial_number.is_empty() {
            return Err(ParseError::MissingField("serial_number"));
        }

        let purchase_date = self
            .purchase_date
            .ok_or(ParseError::MissingField("purchase_date"))?;

        if self.cells == 0 {
            return Err(ParseError::InvalidValue(
                "cell count must be positive".to_string(),
            ));
        }

        if self.capacity_mah == 0 {
            return Err(ParseError::InvalidValue(
                "capacity must be positive".to_string(),
            ));
        }

        Ok(Battery {
            brand: self.brand,
            model: self.model,
            serial_number: self.serial_number,
            battery_type: self.battery_type,
            cells: self.cells,
            capacity_mah: self.capacity_mah,
            purchase_date,
            status: self.status,
            cycle_count: self.cycle_count,
            last_use_date: self.last_use_date,
            last_charge_date: self.last_charge_date,
            notes: self.notes,
        })
    }
}
