//! Output formatting for batteries and alerts.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::Date;

use skyfuel_core::{AlertPriority, BatteryAlert, health_percentage};
use skyfuel_store::{StatusEvent, StoredBattery};

#[derive(Tabled)]
struct BatteryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Battery")]
    name: String,
    #[tabled(rename = "Type")]
    battery_type: String,
    #[tabled(rename = "Config")]
    config: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Cycles")]
    cycles: u32,
    #[tabled(rename = "Health")]
    health: String,
}

impl BatteryRow {
    fn new(stored: &StoredBattery, today: Date) -> Self {
        let b = &stored.battery;
        Self {
            id: stored.id,
            serial: b.serial_number.clone(),
            name: format!("{} {}", b.brand, b.model).trim().to_string(),
            battery_type: b.battery_type.to_string(),
            config: format!("{}S {}mAh", b.cells, b.capacity_mah),
            status: b.status.to_string(),
            cycles: b.cycle_count,
            health: format!("{}%", health_percentage(b, today)),
        }
    }
}

/// Render a battery list as a table.
pub fn battery_table(batteries: &[StoredBattery], today: Date) -> String {
    let rows: Vec<BatteryRow> = batteries
        .iter()
        .map(|stored| BatteryRow::new(stored, today))
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render the full detail view of a single battery.
pub fn battery_details(stored: &StoredBattery, today: Date) -> String {
    let b = &stored.battery;
    let mut out = String::new();

    out.push_str(&format!("Battery #{}\n", stored.id));
    out.push_str(&format!("  Brand:         {}\n", b.brand));
    out.push_str(&format!("  Model:         {}\n", b.model));
    out.push_str(&format!("  Serial:        {}\n", b.serial_number));
    out.push_str(&format!("  Type:          {}\n", b.battery_type));
    out.push_str(&format!("  Cells:         {}S\n", b.cells));
    out.push_str(&format!("  Capacity:      {} mAh\n", b.capacity_mah));
    out.push_str(&format!("  Purchased:     {}\n", b.purchase_date));
    out.push_str(&format!("  Status:        {}\n", b.status));
    out.push_str(&format!("  Cycles:        {}\n", b.cycle_count));
    out.push_str(&format!(
        "  Health:        {}%\n",
        health_percentage(b, today)
    ));
    if let Some(date) = b.last_use_date {
        out.push_str(&format!("  Last used:     {date}\n"));
    }
    if let Some(date) = b.last_charge_date {
        out.push_str(&format!("  Last charged:  {date}\n"));
    }
    if !b.notes.is_empty() {
        out.push_str(&format!("  Notes:         {}\n", b.notes));
    }

    out
}

/// Render one alert as a single line, with the priority colored when
/// requested.
pub fn alert_line(alert: &BatteryAlert, color: bool) -> String {
    let priority = if color {
        match alert.priority {
            AlertPriority::Critical => alert.priority.to_string().red().bold().to_string(),
            AlertPriority::High => alert.priority.to_string().red().to_string(),
            AlertPriority::Medium => alert.priority.to_string().yellow().to_string(),
            AlertPriority::Low => alert.priority.to_string().green().to_string(),
        }
    } else {
        alert.priority.to_string()
    };

    format!("[{priority}] {}: {}", alert.title, alert.message)
}

/// Render the status transition history of a battery.
pub fn history_lines(events: &[StatusEvent]) -> String {
    let mut out = String::new();
    for event in events {
        let cycle = if event.cycle_completed {
            " (cycle completed)"
        } else {
            ""
        };
        out.push_str(&format!(
            "{}  {} -> {}{}\n",
            event.changed_at.date(),
            event.from_status,
            event.to_status,
            cycle
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfuel_core::AlertKind;
    use skyfuel_types::{Battery, BatteryStatus, BatteryType};
    use time::OffsetDateTime;
    use time::macros::date;

    fn stored() -> StoredBattery {
        let battery = Battery::builder()
            .brand("Tattu")
            .model("R-Line")
            .serial_number("SN001")
            .battery_type(BatteryType::Lipo)
            .cells(4)
            .capacity_mah(1550)
            .purchase_date(date!(2024 - 03 - 01))
            .status(BatteryStatus::Charged)
            .cycle_count(12)
            .try_build()
            .unwrap();

        StoredBattery {
            id: 1,
            battery,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_battery_table_contains_fields() {
        let table = battery_table(&[stored()], date!(2024 - 03 - 01));
        assert!(table.contains("SN001"));
        assert!(table.contains("Tattu R-Line"));
        assert!(table.contains("4S 1550mAh"));
        assert!(table.contains("97%")); // 100 - 12 * 0.25 truncated
    }

    #[test]
    fn test_battery_details_skips_absent_dates() {
        let details = battery_details(&stored(), date!(2024 - 03 - 01));
        assert!(details.contains("Serial:        SN001"));
        assert!(!details.contains("Last used"));
        assert!(!details.contains("Notes"));
    }

    #[test]
    fn test_alert_line_plain() {
        let alert = BatteryAlert {
            kind: AlertKind::LowHealth,
            priority: AlertPriority::Critical,
            title: "Battery health is low".to_string(),
            message: "SN001 is down to 8% estimated health".to_string(),
        };

        let line = alert_line(&alert, false);
        assert_eq!(
            line,
            "[Critical] Battery health is low: SN001 is down to 8% estimated health"
        );
    }
}
