//! SKYFUEL QR payload codec.
//!
//! Encodes a small structured record into a single line of text for embedding
//! in a QR image, and decodes it back. The format is `::`-delimited with a
//! literal `SKYFUEL` prefix:
//!
//! ```text
//! SKYFUEL::<ENTITY_TYPE>::<ENTITY_ID>::<TIMESTAMP>::<VERSION>[::<CHECKSUM>][::<METADATA>]
//! ```
//!
//! `<METADATA>` is a comma-separated list of `key=value` pairs. The generic
//! codec performs no escaping; the battery-share layer escapes `,` and `=`
//! inside values before insertion (see [`for_share_battery`](QrCodeData::for_share_battery)).
//!
//! Decoding never fails loudly: anything that is not a valid payload comes
//! back as `None`, and malformed individual fields degrade to defaults
//! (unknown entity type becomes `Other`, a bad timestamp becomes 0, a bad
//! version becomes 1).
//!
//! There is also a legacy plain-text format, `BATTERY_<id>_<serial>`, which
//! predates the structured payload; [`battery_id_from_code`] recognizes both
//! so previously printed labels keep scanning.

use core::fmt;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use skyfuel_types::{Battery, BatteryStatus, BatteryType};

/// Literal prefix of every structured payload.
pub const QR_PREFIX: &str = "SKYFUEL";

/// Segment delimiter.
pub const QR_DELIMITER: &str = "::";

/// Prefix of the legacy battery label format.
pub const LEGACY_PREFIX: &str = "BATTERY_";

const ISO_DATE: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// What kind of entity a payload refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QrEntityType {
    /// A battery identification label.
    Battery,
    /// A full battery serialization for device-to-device sharing.
    BatteryShare,
    /// A maintenance record.
    Maintenance,
    /// A user.
    User,
    /// A storage location.
    Location,
    /// A drone airframe.
    Drone,
    /// Anything unrecognized.
    Other,
}

impl QrEntityType {
    /// The name written into the payload.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            QrEntityType::Battery => "BATTERY",
            QrEntityType::BatteryShare => "BATTERY_SHARE",
            QrEntityType::Maintenance => "MAINTENANCE",
            QrEntityType::User => "USER",
            QrEntityType::Location => "LOCATION",
            QrEntityType::Drone => "DRONE",
            QrEntityType::Other => "OTHER",
        }
    }

    /// Parse a payload name. Unrecognized names become [`QrEntityType::Other`]
    /// rather than failing the whole decode.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Self {
        match name {
            "BATTERY" => QrEntityType::Battery,
            "BATTERY_SHARE" => QrEntityType::BatteryShare,
            "MAINTENANCE" => QrEntityType::Maintenance,
            "USER" => QrEntityType::User,
            "LOCATION" => QrEntityType::Location,
            "DRONE" => QrEntityType::Drone,
            _ => QrEntityType::Other,
        }
    }
}

impl fmt::Display for QrEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A decoded (or to-be-encoded) QR payload.
///
/// Pure value type with no identity beyond its encoded representation.
/// Metadata is an ordered list of key/value pairs; encode order is exactly
/// insertion order, which keeps `decode(encode(x)) == x` for the fields the
/// format carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCodeData {
    /// What the payload refers to.
    pub entity_type: QrEntityType,
    /// Identifier of the entity, verbatim.
    pub entity_id: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    /// Payload format version.
    pub version: i32,
    /// Optional integrity checksum.
    pub checksum: Option<String>,
    /// Ordered key/value metadata.
    pub metadata: Vec<(String, String)>,
}

impl QrCodeData {
    /// Create a payload with version 1, no checksum and no metadata.
    #[must_use]
    pub fn new(entity_type: QrEntityType, entity_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            timestamp,
            version: 1,
            checksum: None,
            metadata: Vec::new(),
        }
    }

    /// Set the format version.
    #[must_use]
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Set the checksum segment.
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Append a metadata pair. Keys are not deduplicated; lookup returns the
    /// first match.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Look up a metadata value by key.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Encode into the single-line wire format.
    ///
    /// Deterministic pure function of the record. Metadata is joined as
    /// `k1=v1,k2=v2` in insertion order, with no escaping at this layer.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = format!(
            "{QR_PREFIX}{QR_DELIMITER}{}{QR_DELIMITER}{}{QR_DELIMITER}{}{QR_DELIMITER}{}",
            self.entity_type.wire_name(),
            self.entity_id,
            self.timestamp,
            self.version,
        );

        if let Some(checksum) = &self.checksum {
            out.push_str(QR_DELIMITER);
            out.push_str(checksum);
        }

        if !self.metadata.is_empty() {
            let joined = self
                .metadata
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(QR_DELIMITER);
            out.push_str(&joined);
        }

        out
    }

    /// Decode a payload, returning `None` for anything malformed.
    ///
    /// Tolerances, in order:
    /// - not starting with `SKYFUEL::` fails outright;
    /// - fewer than 5 segments fails outright;
    /// - an unrecognized entity type becomes [`QrEntityType::Other`];
    /// - an unparseable timestamp becomes 0, an unparseable version 1;
    /// - segment 5 is metadata if it contains `=`, otherwise a checksum with
    ///   metadata (if any) expected in segment 6.
    ///
    /// The checksum/metadata disambiguation is a known ambiguity carried over
    /// from the original format: a checksum that happens to contain `=` is
    /// misclassified as metadata. Callers that mint checksums must avoid `=`.
    #[must_use]
    pub fn decode(text: &str) -> Option<Self> {
        let prefix = format!("{QR_PREFIX}{QR_DELIMITER}");
        if !text.starts_with(&prefix) {
            return None;
        }

        let segments: Vec<&str> = text.split(QR_DELIMITER).collect();
        if segments.len() < 5 {
            return None;
        }

        let entity_type = QrEntityType::from_wire_name(segments[1]);
        let entity_id = segments[2].to_string();
        let timestamp = segments[3].parse::<i64>().unwrap_or(0);
        let version = segments[4].parse::<i32>().unwrap_or(1);

        let mut checksum = None;
        let mut metadata = Vec::new();

        if let Some(fifth) = segments.get(5) {
            if fifth.contains('=') {
                metadata = parse_metadata(fifth);
            } else {
                checksum = Some((*fifth).to_string());
                if let Some(sixth) = segments.get(6) {
                    metadata = parse_metadata(sixth);
                }
            }
        }

        Some(Self {
            entity_type,
            entity_id,
            timestamp,
            version,
            checksum,
            metadata,
        })
    }

    /// Build a battery identification payload.
    ///
    /// Version 1, timestamped at `at`, with `brand`, `model`, and `sn`
    /// metadata carried only when non-empty.
    #[must_use]
    pub fn for_battery(
        id: i64,
        serial_number: &str,
        brand: &str,
        model: &str,
        at: OffsetDateTime,
    ) -> Self {
        let mut data = Self::new(QrEntityType::Battery, id.to_string(), epoch_millis(at));
        if !brand.is_empty() {
            data = data.with_metadata("brand", brand);
        }
        if !model.is_empty() {
            data = data.with_metadata("model", model);
        }
        if !serial_number.is_empty() {
            data = data.with_metadata("sn", serial_number);
        }
        data
    }

    /// Build a battery-share payload carrying a full field serialization.
    ///
    /// Version 2, keyed by serial number rather than database id so the
    /// receiving device can merge on its own inventory. Every metadata value
    /// is escaped with [`escape_metadata_value`]; dates are ISO
    /// `year-month-day`.
    #[must_use]
    pub fn for_share_battery(battery: &Battery, at: OffsetDateTime) -> Self {
        let mut data = Self::new(
            QrEntityType::BatteryShare,
            battery.serial_number.clone(),
            epoch_millis(at),
        )
        .with_version(2)
        .with_metadata("brand", escape_metadata_value(&battery.brand))
        .with_metadata("model", escape_metadata_value(&battery.model))
        .with_metadata("sn", escape_metadata_value(&battery.serial_number))
        .with_metadata("type", battery.battery_type.wire_name())
        .with_metadata("cells", battery.cells.to_string())
        .with_metadata("capacity", battery.capacity_mah.to_string())
        .with_metadata("purchaseDate", format_iso_date(battery.purchase_date))
        .with_metadata("status", battery.status.wire_name())
        .with_metadata("cycleCount", battery.cycle_count.to_string());

        if !battery.notes.trim().is_empty() {
            data = data.with_metadata("notes", escape_metadata_value(&battery.notes));
        }
        if let Some(date) = battery.last_use_date {
            data = data.with_metadata("lastUseDate", format_iso_date(date));
        }
        if let Some(date) = battery.last_charge_date {
            data = data.with_metadata("lastChargeDate", format_iso_date(date));
        }

        data
    }

    /// Reconstruct a battery from a share payload.
    ///
    /// Fails closed: brand, model, type, cells, capacity, and purchase date
    /// must all be present and parseable, otherwise the whole reconstruction
    /// returns `None` rather than a partially populated battery. Optional
    /// fields (status, cycle count, notes, last use/charge dates) default
    /// when absent or malformed.
    #[must_use]
    pub fn to_battery(&self) -> Option<Battery> {
        let brand = self.unescaped_metadata("brand")?;
        let model = self.unescaped_metadata("model")?;
        let battery_type = BatteryType::from_wire_name(&self.unescaped_metadata("type")?);
        let cells = self.unescaped_metadata("cells")?.parse::<u8>().ok()?;
        let capacity = self.unescaped_metadata("capacity")?.parse::<u32>().ok()?;
        let purchase_date = parse_iso_date(&self.unescaped_metadata("purchaseDate")?)?;

        let serial_number = self
            .unescaped_metadata("sn")
            .unwrap_or_else(|| self.entity_id.clone());

        let status = self
            .metadata_value("status")
            .map(BatteryStatus::from_wire_name)
            .unwrap_or_default();
        let cycle_count = self
            .metadata_value("cycleCount")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        let notes = self.unescaped_metadata("notes").unwrap_or_default();

        let mut builder = Battery::builder()
            .brand(brand)
            .model(model)
            .serial_number(serial_number)
            .battery_type(battery_type)
            .cells(cells)
            .capacity_mah(capacity)
            .purchase_date(purchase_date)
            .status(status)
            .cycle_count(cycle_count)
            .notes(notes);

        if let Some(date) = self.metadata_value("lastUseDate").and_then(parse_iso_date) {
            builder = builder.last_use_date(date);
        }
        if let Some(date) = self.metadata_value("lastChargeDate").and_then(parse_iso_date) {
            builder = builder.last_charge_date(date);
        }

        builder.try_build().ok()
    }

    fn unescaped_metadata(&self, key: &str) -> Option<String> {
        self.metadata_value(key).map(unescape_metadata_value)
    }
}

fn parse_metadata(segment: &str) -> Vec<(String, String)> {
    segment
        .split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

fn epoch_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

fn format_iso_date(date: Date) -> String {
    // The year-month-day description cannot fail for a valid Date
    date.format(ISO_DATE).unwrap_or_default()
}

fn parse_iso_date(text: &str) -> Option<Date> {
    Date::parse(text, ISO_DATE).ok()
}

/// Escape a metadata value for embedding: `,` becomes `&#44;` and `=`
/// becomes `&#61;`.
///
/// Applied by the battery-share encoder, not by the generic codec.
#[must_use]
pub fn escape_metadata_value(value: &str) -> String {
    value.replace(',', "&#44;").replace('=', "&#61;")
}

/// Reverse of [`escape_metadata_value`].
#[must_use]
pub fn unescape_metadata_value(value: &str) -> String {
    value.replace("&#44;", ",").replace("&#61;", "=")
}

/// Extract the battery id from the legacy `BATTERY_<id>_<serial>` format.
#[must_use]
pub fn legacy_battery_id(code: &str) -> Option<i64> {
    if !code.starts_with(LEGACY_PREFIX) {
        return None;
    }
    code.split('_').nth(1)?.parse().ok()
}

/// Identify a battery from a scanned code in either format.
///
/// Accepts both the structured `SKYFUEL::BATTERY::...` payload and the
/// legacy `BATTERY_<id>_<serial>` label.
#[must_use]
pub fn battery_id_from_code(code: &str) -> Option<i64> {
    if let Some(data) = QrCodeData::decode(code) {
        if data.entity_type == QrEntityType::Battery {
            return data.entity_id.parse().ok();
        }
        return None;
    }
    legacy_battery_id(code)
}
