//! Argument parsing helpers.

use time::Date;
use time::macros::format_description;

use skyfuel_types::{BatteryStatus, BatteryType};

const ISO_DATE: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parse a chemistry argument. Strict, unlike the QR decoder: a typo on the
/// command line should be an error, not silently `Other`.
pub fn parse_battery_type(value: &str) -> Result<BatteryType, String> {
    match value.to_lowercase().as_str() {
        "lipo" => Ok(BatteryType::Lipo),
        "li-ion" | "liion" | "li_ion" => Ok(BatteryType::LiIon),
        "nimh" => Ok(BatteryType::Nimh),
        "life" => Ok(BatteryType::Life),
        "other" => Ok(BatteryType::Other),
        _ => Err(format!(
            "unknown battery type '{value}' (expected lipo, li-ion, nimh, life, or other)"
        )),
    }
}

/// Parse a status argument.
pub fn parse_status(value: &str) -> Result<BatteryStatus, String> {
    match value.to_lowercase().as_str() {
        "charged" => Ok(BatteryStatus::Charged),
        "discharged" => Ok(BatteryStatus::Discharged),
        "storage" => Ok(BatteryStatus::Storage),
        "out-of-service" | "out_of_service" | "retired" => Ok(BatteryStatus::OutOfService),
        _ => Err(format!(
            "unknown status '{value}' (expected charged, discharged, storage, or out-of-service)"
        )),
    }
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, ISO_DATE).map_err(|_| format!("invalid date '{value}' (expected YYYY-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_battery_type() {
        assert_eq!(parse_battery_type("lipo").unwrap(), BatteryType::Lipo);
        assert_eq!(parse_battery_type("LiPo").unwrap(), BatteryType::Lipo);
        assert_eq!(parse_battery_type("li-ion").unwrap(), BatteryType::LiIon);
        assert_eq!(parse_battery_type("li_ion").unwrap(), BatteryType::LiIon);
        assert!(parse_battery_type("plutonium").is_err());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("charged").unwrap(), BatteryStatus::Charged);
        assert_eq!(
            parse_status("out-of-service").unwrap(),
            BatteryStatus::OutOfService
        );
        assert_eq!(parse_status("retired").unwrap(), BatteryStatus::OutOfService);
        assert!(parse_status("flying").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-01").unwrap(), date!(2024 - 03 - 01));
        assert!(parse_date("03/01/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }
}
