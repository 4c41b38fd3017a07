use crate::date_coercion::excel_serial_to_datetime;
use crate::models::Value;
use calamine::Data;
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes a raw cell: collapses whitespace in text, maps unset/blank to `Absent`.
pub fn normalize(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Absent,
        Data::String(s) => collapse_text(s),
        Data::DateTimeIso(s) | Data::DurationIso(s) => collapse_text(s),
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Int(*i),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            match excel_serial_to_datetime(serial) {
                Some(datetime) => Value::DateTime(datetime),
                None => Value::Number(serial),
            }
        }
        Data::Error(e) => Value::Text(e.to_string()),
    }
}

fn collapse_text(s: &str) -> Value {
    let collapsed = WHITESPACE.replace_all(s, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        Value::Absent
    } else {
        Value::Text(trimmed.to_string())
    }
}
