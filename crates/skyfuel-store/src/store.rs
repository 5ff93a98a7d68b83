//! Main store implementation.

use std::io;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

use skyfuel_types::{Battery, BatteryStatus, BatteryType};

use crate::error::{Error, Result};
use crate::models::{ImportResult, StatusEvent, StoredBattery, format_date, parse_date};
use crate::queries::BatteryQuery;
use crate::schema;

/// SQLite-based store for the battery inventory.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for better performance
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

const BATTERY_COLUMNS: &str = "id, brand, model, serial_number, battery_type, cells, \
     capacity_mah, purchase_date, status, cycle_count, last_use_date, last_charge_date, \
     notes, created_at, updated_at";

fn row_to_stored(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredBattery> {
    let battery = Battery {
        brand: row.get(1)?,
        model: row.get(2)?,
        serial_number: row.get(3)?,
        battery_type: BatteryType::from_wire_name(&row.get::<_, String>(4)?),
        cells: row.get::<_, i64>(5)? as u8,
        capacity_mah: row.get::<_, i64>(6)? as u32,
        purchase_date: parse_date(&row.get::<_, String>(7)?).unwrap(),
        status: BatteryStatus::from_wire_name(&row.get::<_, String>(8)?),
        cycle_count: row.get::<_, i64>(9)? as u32,
        last_use_date: row.get::<_, Option<String>>(10)?.and_then(|s| parse_date(&s)),
        last_charge_date: row.get::<_, Option<String>>(11)?.and_then(|s| parse_date(&s)),
        notes: row.get(12)?,
    };

    Ok(StoredBattery {
        id: row.get(0)?,
        battery,
        created_at: OffsetDateTime::from_unix_timestamp(row.get(13)?).unwrap(),
        updated_at: OffsetDateTime::from_unix_timestamp(row.get(14)?).unwrap(),
    })
}

// Battery CRUD
impl Store {
    /// Insert a battery, or update the existing row with the same serial
    /// number. The serial number is the merge key across imports and shares.
    pub fn upsert_battery(&self, battery: &Battery) -> Result<StoredBattery> {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        self.conn.execute(
            "INSERT INTO batteries (brand, model, serial_number, battery_type, cells,
                capacity_mah, purchase_date, status, cycle_count, last_use_date,
                last_charge_date, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
             ON CONFLICT(serial_number) DO UPDATE SET
                brand = ?1,
                model = ?2,
                battery_type = ?4,
                cells = ?5,
                capacity_mah = ?6,
                purchase_date = ?7,
                status = ?8,
                cycle_count = ?9,
                last_use_date = ?10,
                last_charge_date = ?11,
                notes = ?12,
                updated_at = ?13",
            rusqlite::params![
                battery.brand,
                battery.model,
                battery.serial_number,
                battery.battery_type.wire_name(),
                battery.cells,
                battery.capacity_mah,
                format_date(battery.purchase_date),
                battery.status.wire_name(),
                battery.cycle_count,
                battery.last_use_date.map(format_date),
                battery.last_charge_date.map(format_date),
                battery.notes,
                now,
            ],
        )?;

        self.get_by_serial(&battery.serial_number)?
            .ok_or_else(|| Error::SerialNotFound(battery.serial_number.clone()))
    }

    /// Get a battery by row ID.
    pub fn get_battery(&self, id: i64) -> Result<Option<StoredBattery>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BATTERY_COLUMNS} FROM batteries WHERE id = ?"))?;

        let battery = stmt.query_row([id], row_to_stored).optional()?;
        Ok(battery)
    }

    /// Get a battery by serial number.
    pub fn get_by_serial(&self, serial_number: &str) -> Result<Option<StoredBattery>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BATTERY_COLUMNS} FROM batteries WHERE serial_number = ?"
        ))?;

        let battery = stmt.query_row([serial_number], row_to_stored).optional()?;
        Ok(battery)
    }

    /// List batteries matching a query.
    pub fn list_batteries(&self, query: &BatteryQuery) -> Result<Vec<StoredBattery>> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = query.status {
            conditions.push("status = ?");
            params.push(Box::new(status.wire_name()));
        }

        if let Some(battery_type) = query.battery_type {
            conditions.push("battery_type = ?");
            params.push(Box::new(battery_type.wire_name()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order = if query.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT {BATTERY_COLUMNS} FROM batteries {where_clause} ORDER BY updated_at {order}, id {order}"
        );

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let batteries = stmt
            .query_map(params_ref.as_slice(), row_to_stored)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(batteries)
    }

    /// Delete a battery and its status history. Returns true if a row was
    /// removed.
    pub fn delete_battery(&self, id: i64) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM batteries WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    /// Count batteries in the inventory.
    pub fn count_batteries(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM batteries", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

// Status transitions
impl Store {
    /// Change a battery's status, recording the transition.
    ///
    /// Side effects on the stored battery:
    /// - Discharged → Charged completes a charge cycle: cycle count is
    ///   incremented and the last charge date set to `today`;
    /// - any transition into Discharged stamps the last use date.
    ///
    /// Returns the updated row.
    pub fn set_status(
        &self,
        id: i64,
        new_status: BatteryStatus,
        today: Date,
    ) -> Result<StoredBattery> {
        let stored = self.get_battery(id)?.ok_or(Error::BatteryNotFound(id))?;
        let old_status = stored.battery.status;

        let cycle_completed =
            old_status == BatteryStatus::Discharged && new_status == BatteryStatus::Charged;

        let mut battery = stored.battery;
        battery.status = new_status;
        if cycle_completed {
            battery.cycle_count += 1;
            battery.last_charge_date = Some(today);
        }
        if new_status == BatteryStatus::Discharged {
            battery.last_use_date = Some(today);
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();

        self.conn.execute(
            "UPDATE batteries SET
                status = ?2,
                cycle_count = ?3,
                last_use_date = ?4,
                last_charge_date = ?5,
                updated_at = ?6
             WHERE id = ?1",
            rusqlite::params![
                id,
                battery.status.wire_name(),
                battery.cycle_count,
                battery.last_use_date.map(format_date),
                battery.last_charge_date.map(format_date),
                now,
            ],
        )?;

        self.conn.execute(
            "INSERT INTO status_events (battery_id, from_status, to_status, changed_at, cycle_completed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                id,
                old_status.wire_name(),
                new_status.wire_name(),
                now,
                cycle_completed,
            ],
        )?;

        debug!(
            "Status change for battery {}: {} -> {} (cycle completed: {})",
            id,
            old_status.wire_name(),
            new_status.wire_name(),
            cycle_completed
        );

        self.get_battery(id)?.ok_or(Error::BatteryNotFound(id))
    }

    /// Status transition history for a battery, oldest first.
    pub fn status_history(&self, battery_id: i64) -> Result<Vec<StatusEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, battery_id, from_status, to_status, changed_at, cycle_completed
             FROM status_events WHERE battery_id = ? ORDER BY changed_at ASC, id ASC",
        )?;

        let events = stmt
            .query_map([battery_id], |row| {
                Ok(StatusEvent {
                    id: row.get(0)?,
                    battery_id: row.get(1)?,
                    from_status: BatteryStatus::from_wire_name(&row.get::<_, String>(2)?),
                    to_status: BatteryStatus::from_wire_name(&row.get::<_, String>(3)?),
                    changed_at: OffsetDateTime::from_unix_timestamp(row.get(4)?).unwrap(),
                    cycle_completed: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(events)
    }
}

/// One battery row in CSV import/export.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    brand: String,
    model: String,
    serial_number: String,
    battery_type: String,
    cells: u8,
    capacity_mah: u32,
    purchase_date: String,
    status: String,
    cycle_count: u32,
    last_use_date: String,
    last_charge_date: String,
    notes: String,
}

impl CsvRow {
    fn from_battery(battery: &Battery) -> Self {
        Self {
            brand: battery.brand.clone(),
            model: battery.model.clone(),
            serial_number: battery.serial_number.clone(),
            battery_type: battery.battery_type.wire_name().to_string(),
            cells: battery.cells,
            capacity_mah: battery.capacity_mah,
            purchase_date: format_date(battery.purchase_date),
            status: battery.status.wire_name().to_string(),
            cycle_count: battery.cycle_count,
            last_use_date: battery.last_use_date.map(format_date).unwrap_or_default(),
            last_charge_date: battery.last_charge_date.map(format_date).unwrap_or_default(),
            notes: battery.notes.clone(),
        }
    }

    fn into_battery(self) -> Result<Battery> {
        let purchase_date = parse_date(&self.purchase_date).ok_or_else(|| {
            Error::InvalidRecord(format!(
                "unparseable purchase date {:?} for serial {}",
                self.purchase_date, self.serial_number
            ))
        })?;

        let mut builder = Battery::builder()
            .brand(self.brand)
            .model(self.model)
            .serial_number(&self.serial_number)
            .battery_type(BatteryType::from_wire_name(&self.battery_type))
            .cells(self.cells)
            .capacity_mah(self.capacity_mah)
            .purchase_date(purchase_date)
            .status(BatteryStatus::from_wire_name(&self.status))
            .cycle_count(self.cycle_count)
            .notes(self.notes);

        if let Some(date) = parse_date(&self.last_use_date) {
            builder = builder.last_use_date(date);
        }
        if let Some(date) = parse_date(&self.last_charge_date) {
            builder = builder.last_charge_date(date);
        }

        builder.try_build().map_err(|e| {
            Error::InvalidRecord(format!("serial {}: {}", self.serial_number, e))
        })
    }
}

// Export / import
impl Store {
    /// Merge a batch of batteries into the inventory, keyed by serial number.
    ///
    /// An unknown serial inserts a new row; a known serial updates the
    /// existing row in place.
    pub fn merge_batteries<I>(&self, batteries: I) -> Result<ImportResult>
    where
        I: IntoIterator<Item = Battery>,
    {
        let mut result = ImportResult::default();

        for battery in batteries {
            let existing = self.get_by_serial(&battery.serial_number)?;
            self.upsert_battery(&battery)?;
            if existing.is_some() {
                result.updated += 1;
            } else {
                result.inserted += 1;
            }
        }

        info!(
            "Import merged {} new and {} updated batteries",
            result.inserted, result.updated
        );
        Ok(result)
    }

    /// Export the full inventory as pretty-printed JSON. Returns the number
    /// of batteries written.
    pub fn export_json<W: io::Write>(&self, writer: W) -> Result<usize> {
        let batteries: Vec<Battery> = self
            .list_batteries(&BatteryQuery::new().oldest_first())?
            .into_iter()
            .map(|stored| stored.battery)
            .collect();

        serde_json::to_writer_pretty(writer, &batteries)?;
        Ok(batteries.len())
    }

    /// Import batteries from JSON produced by [`export_json`](Self::export_json),
    /// merging on serial number.
    pub fn import_json<R: io::Read>(&self, reader: R) -> Result<ImportResult> {
        let batteries: Vec<Battery> = serde_json::from_reader(reader)?;
        self.merge_batteries(batteries)
    }

    /// Export the full inventory as CSV. Returns the number of batteries
    /// written.
    pub fn export_csv<W: io::Write>(&self, writer: W) -> Result<usize> {
        let batteries = self.list_batteries(&BatteryQuery::new().oldest_first())?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        for stored in &batteries {
            csv_writer.serialize(CsvRow::from_battery(&stored.battery))?;
        }
        csv_writer.flush()?;

        Ok(batteries.len())
    }

    /// Import batteries from CSV produced by [`export_csv`](Self::export_csv),
    /// merging on serial number.
    pub fn import_csv<R: io::Read>(&self, reader: R) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut batteries = Vec::new();

        for row in csv_reader.deserialize::<CsvRow>() {
            batteries.push(row?.into_battery()?);
        }

        self.merge_batteries(batteries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn test_battery(serial: &str) -> Battery {
        Battery::builder()
            .brand("Tattu")
            .model("R-Line 1550")
            .serial_number(serial)
            .battery_type(BatteryType::Lipo)
            .cells(4)
            .capacity_mah(1550)
            .purchase_date(date!(2024 - 03 - 01))
            .status(BatteryStatus::Charged)
            .cycle_count(10)
            .try_build()
            .unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.count_batteries().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let battery = test_battery("SN001");

        let stored = store.upsert_battery(&battery).unwrap();
        assert_eq!(stored.battery, battery);

        let fetched = store.get_battery(stored.id).unwrap().unwrap();
        assert_eq!(fetched.battery, battery);
    }

    #[test]
    fn test_upsert_merges_on_serial_number() {
        let store = Store::open_in_memory().unwrap();

        let first = store.upsert_battery(&test_battery("SN001")).unwrap();

        let mut changed = test_battery("SN001");
        changed.cycle_count = 99;
        changed.notes = "updated".to_string();
        let second = store.upsert_battery(&changed).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.battery.cycle_count, 99);
        assert_eq!(store.count_batteries().unwrap(), 1);
    }

    #[test]
    fn test_get_by_serial() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_battery(&test_battery("SN001")).unwrap();

        assert!(store.get_by_serial("SN001").unwrap().is_some());
        assert!(store.get_by_serial("SN-MISSING").unwrap().is_none());
    }

    #[test]
    fn test_list_with_filters() {
        let store = Store::open_in_memory().unwrap();

        let mut a = test_battery("SN-A");
        a.status = BatteryStatus::Discharged;
        store.upsert_battery(&a).unwrap();

        let mut b = test_battery("SN-B");
        b.battery_type = BatteryType::LiIon;
        store.upsert_battery(&b).unwrap();

        let discharged = store
            .list_batteries(&BatteryQuery::new().status(BatteryStatus::Discharged))
            .unwrap();
        assert_eq!(discharged.len(), 1);
        assert_eq!(discharged[0].battery.serial_number, "SN-A");

        let li_ion = store
            .list_batteries(&BatteryQuery::new().battery_type(BatteryType::LiIon))
            .unwrap();
        assert_eq!(li_ion.len(), 1);
        assert_eq!(li_ion[0].battery.serial_number, "SN-B");

        let all = store.list_batteries(&BatteryQuery::new()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_delete_battery() {
        let store = Store::open_in_memory().unwrap();
        let stored = store.upsert_battery(&test_battery("SN001")).unwrap();

        assert!(store.delete_battery(stored.id).unwrap());
        assert!(!store.delete_battery(stored.id).unwrap());
        assert_eq!(store.count_batteries().unwrap(), 0);
    }

    #[test]
    fn test_discharge_to_charge_completes_cycle() {
        let store = Store::open_in_memory().unwrap();
        let stored = store.upsert_battery(&test_battery("SN001")).unwrap();
        let today = date!(2024 - 06 - 01);

        let after_use = store
            .set_status(stored.id, BatteryStatus::Discharged, today)
            .unwrap();
        assert_eq!(after_use.battery.cycle_count, 10);
        assert_eq!(after_use.battery.last_use_date, Some(today));

        let after_charge = store
            .set_status(stored.id, BatteryStatus::Charged, today)
            .unwrap();
        assert_eq!(after_charge.battery.cycle_count, 11);
        assert_eq!(after_charge.battery.last_charge_date, Some(today));
    }

    #[test]
    fn test_other_transitions_do_not_increment_cycles() {
        let store = Store::open_in_memory().unwrap();
        let stored = store.upsert_battery(&test_battery("SN001")).unwrap();
        let today = date!(2024 - 06 - 01);

        // Charged -> Storage -> Charged: no discharge happened
        store.set_status(stored.id, BatteryStatus::Storage, today).unwrap();
        let back = store.set_status(stored.id, BatteryStatus::Charged, today).unwrap();
        assert_eq!(back.battery.cycle_count, 10);
    }

    #[test]
    fn test_status_history_records_transitions() {
        let store = Store::open_in_memory().unwrap();
        let stored = store.upsert_battery(&test_battery("SN001")).unwrap();
        let today = date!(2024 - 06 - 01);

        store.set_status(stored.id, BatteryStatus::Discharged, today).unwrap();
        store.set_status(stored.id, BatteryStatus::Charged, today).unwrap();

        let history = store.status_history(stored.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].from_status, BatteryStatus::Charged);
        assert_eq!(history[0].to_status, BatteryStatus::Discharged);
        assert!(!history[0].cycle_completed);
        assert!(history[1].cycle_completed);
    }

    #[test]
    fn test_set_status_unknown_battery() {
        let store = Store::open_in_memory().unwrap();
        let result = store.set_status(999, BatteryStatus::Charged, date!(2024 - 06 - 01));
        assert!(matches!(result, Err(Error::BatteryNotFound(999))));
    }

    #[test]
    fn test_json_export_import_round_trip() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_battery(&test_battery("SN001")).unwrap();
        store.upsert_battery(&test_battery("SN002")).unwrap();

        let mut buffer = Vec::new();
        assert_eq!(store.export_json(&mut buffer).unwrap(), 2);

        let other = Store::open_in_memory().unwrap();
        let result = other.import_json(buffer.as_slice()).unwrap();
        assert_eq!(result.inserted, 2);
        assert_eq!(result.updated, 0);
        assert_eq!(other.count_batteries().unwrap(), 2);

        // Importing again merges instead of duplicating
        let result = other.import_json(buffer.as_slice()).unwrap();
        assert_eq!(result.inserted, 0);
        assert_eq!(result.updated, 2);
        assert_eq!(other.count_batteries().unwrap(), 2);
    }

    #[test]
    fn test_csv_export_import_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let mut battery = test_battery("SN001");
        battery.last_use_date = Some(date!(2024 - 05 - 10));
        battery.notes = "notes with, a comma".to_string();
        store.upsert_battery(&battery).unwrap();

        let mut buffer = Vec::new();
        assert_eq!(store.export_csv(&mut buffer).unwrap(), 1);

        let other = Store::open_in_memory().unwrap();
        let result = other.import_csv(buffer.as_slice()).unwrap();
        assert_eq!(result.inserted, 1);

        let restored = other.get_by_serial("SN001").unwrap().unwrap();
        assert_eq!(restored.battery, battery);
    }

    #[test]
    fn test_csv_import_rejects_invalid_record() {
        let store = Store::open_in_memory().unwrap();
        let csv = "brand,model,serial_number,battery_type,cells,capacity_mah,purchase_date,status,cycle_count,last_use_date,last_charge_date,notes\n\
                   Tattu,R-Line,SN001,LIPO,0,1550,2024-03-01,CHARGED,0,,,\n";

        let result = store.import_csv(csv.as_bytes());
        assert!(matches!(result, Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("skyfuel.db");

        let store = Store::open(&path).unwrap();
        store.upsert_battery(&test_battery("SN001")).unwrap();
        drop(store);

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.count_batteries().unwrap(), 1);
    }
}
