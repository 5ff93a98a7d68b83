//! Command implementations.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use time::{Date, OffsetDateTime};
use tracing::info;

use skyfuel_core::{
    QrCodeData, QrEntityType, battery_id_from_code, check_all_batteries_alerts,
    check_battery_alerts, health_percentage,
};
use skyfuel_store::{BatteryQuery, Store, StoredBattery};
use skyfuel_types::{Battery, BatteryStatus, BatteryType};

use crate::format;

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn find_battery(store: &Store, id: i64) -> Result<StoredBattery> {
    store
        .get_battery(id)?
        .ok_or_else(|| anyhow!("no battery with id {id}"))
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    store: &Store,
    brand: String,
    model: String,
    serial: String,
    battery_type: BatteryType,
    cells: u8,
    capacity: u32,
    purchase_date: Option<Date>,
    notes: Option<String>,
) -> Result<()> {
    let battery = Battery::builder()
        .brand(brand)
        .model(model)
        .serial_number(serial)
        .battery_type(battery_type)
        .cells(cells)
        .capacity_mah(capacity)
        .purchase_date(purchase_date.unwrap_or_else(today))
        .status(BatteryStatus::Charged)
        .notes(notes.unwrap_or_default())
        .try_build()?;

    let stored = store.upsert_battery(&battery)?;
    info!("Added battery {} ({})", stored.id, stored.battery.serial_number);
    print!("{}", format::battery_details(&stored, today()));
    Ok(())
}

pub fn list(
    store: &Store,
    status: Option<BatteryStatus>,
    battery_type: Option<BatteryType>,
    output: &str,
) -> Result<()> {
    let mut query = BatteryQuery::new();
    if let Some(status) = status {
        query = query.status(status);
    }
    if let Some(battery_type) = battery_type {
        query = query.battery_type(battery_type);
    }

    let batteries = store.list_batteries(&query)?;

    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&batteries)?),
        _ => {
            if batteries.is_empty() {
                println!("No batteries found");
            } else {
                println!("{}", format::battery_table(&batteries, today()));
            }
        }
    }
    Ok(())
}

pub fn show(store: &Store, id: i64, output: &str, color: bool) -> Result<()> {
    let stored = find_battery(store, id)?;
    let now = today();

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&stored)?);
        return Ok(());
    }

    print!("{}", format::battery_details(&stored, now));

    let alerts = check_battery_alerts(&stored.battery, now);
    if !alerts.is_empty() {
        println!("\nAlerts:");
        for alert in &alerts {
            println!("  {}", format::alert_line(alert, color));
        }
    }

    let history = store.status_history(stored.id)?;
    if !history.is_empty() {
        println!("\nStatus history:");
        print!("{}", format::history_lines(&history));
    }

    Ok(())
}

pub fn set_status(store: &Store, id: i64, status: BatteryStatus) -> Result<()> {
    let updated = store.set_status(id, status, today())?;
    println!(
        "Battery {} is now {} ({} cycles)",
        updated.id, updated.battery.status, updated.battery.cycle_count
    );
    Ok(())
}

pub fn health(store: &Store, id: Option<i64>) -> Result<()> {
    let now = today();
    match id {
        Some(id) => {
            let stored = find_battery(store, id)?;
            println!("{}%", health_percentage(&stored.battery, now));
        }
        None => {
            for stored in store.list_batteries(&BatteryQuery::new().oldest_first())? {
                println!(
                    "{:>4}  {:<16} {:>3}%",
                    stored.id,
                    stored.battery.serial_number,
                    health_percentage(&stored.battery, now)
                );
            }
        }
    }
    Ok(())
}

pub fn alerts(store: &Store, output: &str, color: bool) -> Result<()> {
    let batteries: Vec<Battery> = store
        .list_batteries(&BatteryQuery::new())?
        .into_iter()
        .map(|stored| stored.battery)
        .collect();

    let alerts = check_all_batteries_alerts(&batteries, today());

    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&alerts)?),
        _ => {
            if alerts.is_empty() {
                println!("No alerts");
            } else {
                for alert in &alerts {
                    println!("{}", format::alert_line(alert, color));
                }
            }
        }
    }
    Ok(())
}

pub fn qr_encode(store: &Store, id: i64) -> Result<()> {
    let stored = find_battery(store, id)?;
    let b = &stored.battery;
    let data = QrCodeData::for_battery(
        stored.id,
        &b.serial_number,
        &b.brand,
        &b.model,
        OffsetDateTime::now_utc(),
    );
    println!("{}", data.encode());
    Ok(())
}

pub fn qr_share(store: &Store, id: i64) -> Result<()> {
    let stored = find_battery(store, id)?;
    let data = QrCodeData::for_share_battery(&stored.battery, OffsetDateTime::now_utc());
    println!("{}", data.encode());
    Ok(())
}

pub fn qr_decode(store: &Store, code: &str, save: bool) -> Result<()> {
    let Some(data) = QrCodeData::decode(code) else {
        // Structured decode failed; the legacy label format may still match
        if let Some(id) = battery_id_from_code(code) {
            println!("Legacy battery label, id {id}");
            return Ok(());
        }
        bail!("not a recognized QR payload");
    };

    println!("Entity type: {}", data.entity_type);
    println!("Entity id:   {}", data.entity_id);
    println!("Timestamp:   {}", data.timestamp);
    println!("Version:     {}", data.version);
    if let Some(checksum) = &data.checksum {
        println!("Checksum:    {checksum}");
    }
    for (key, value) in &data.metadata {
        println!("  {key} = {value}");
    }

    if data.entity_type == QrEntityType::BatteryShare {
        match data.to_battery() {
            Some(battery) => {
                if save {
                    let result = store.merge_batteries([battery])?;
                    if result.inserted > 0 {
                        println!("\nSaved as a new battery");
                    } else {
                        println!("\nMerged into existing battery with the same serial number");
                    }
                } else {
                    println!("\nShared battery payload is complete; rerun with --save to import");
                }
            }
            None => println!("\nShared battery payload is incomplete, cannot import"),
        }
    }

    Ok(())
}

fn format_for_path(path: &Path, format: Option<&str>) -> Result<String> {
    if let Some(format) = format {
        return Ok(format.to_string());
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok("json".to_string()),
        Some("csv") => Ok("csv".to_string()),
        _ => bail!(
            "cannot infer format from {}; pass --format json|csv",
            path.display()
        ),
    }
}

pub fn export(
    store: &Store,
    output: Option<PathBuf>,
    format: Option<&str>,
) -> Result<()> {
    let (mut writer, format, target): (Box<dyn Write>, String, String) = match output {
        Some(path) => {
            let format = format_for_path(&path, format)?;
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            (Box::new(file), format, path.display().to_string())
        }
        None => (
            Box::new(io::stdout()),
            format.unwrap_or("json").to_string(),
            "stdout".to_string(),
        ),
    };

    let count = match format.as_str() {
        "json" => store.export_json(&mut writer)?,
        "csv" => store.export_csv(&mut writer)?,
        other => bail!("unknown export format '{other}' (expected json or csv)"),
    };
    writer.flush()?;

    info!("Exported {} batteries to {}", count, target);
    Ok(())
}

pub fn import(store: &Store, input: &Path, format: Option<&str>) -> Result<()> {
    let format = format_for_path(input, format)?;
    let mut file =
        File::open(input).with_context(|| format!("failed to open {}", input.display()))?;

    let result = match format.as_str() {
        "json" => store.import_json(&mut file)?,
        "csv" => store.import_csv(&mut file)?,
        other => bail!("unknown import format '{other}' (expected json or csv)"),
    };

    println!(
        "Imported {} new, updated {} existing",
        result.inserted, result.updated
    );
    Ok(())
}

pub fn delete(store: &Store, id: i64) -> Result<()> {
    if store.delete_battery(id)? {
        println!("Deleted battery {id}");
        Ok(())
    } else {
        bail!("no battery with id {id}")
    }
}
