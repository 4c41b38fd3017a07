use crate::models::Value;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Largest serial Excel can display (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

// two-digit years first, %Y would otherwise read "21" as year 21
const DATE_FORMATS: [&str; 6] = [
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];

/// Coerces a normalized value to a calendar date; `None` means invalid.
pub fn coerce_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::DateTime(dt) => Some(dt.date()),
        Value::Number(serial) => excel_serial_to_datetime(serial.trunc()).map(|dt| dt.date()),
        Value::Int(serial) => excel_serial_to_datetime(*serial as f64).map(|dt| dt.date()),
        Value::Text(s) => parse_date_text(s.trim()),
        Value::Absent | Value::Bool(_) => None,
    }
}

/// Parses day-first, ISO and datetime spellings.
fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    for format in &DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    for format in &DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }

    None
}

/// Excel serial number to datetime
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !(1.0..MAX_EXCEL_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    // Excel counts from 1899-12-30 because of its 1900 leap year bug
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    base.checked_add_signed(Duration::days(days) + Duration::seconds(seconds))
}
