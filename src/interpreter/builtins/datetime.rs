//! Date built-ins over epoch-second Ints.
//!
//! Formats accept Java-style tokens (yyyy, MM, dd, HH, mm, ss), which are
//! rewritten into strftime specifiers before rendering in local time.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Local, NaiveDate, TimeZone, Utc};

use super::{integer, text, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("Date.now", |_args| {
        Ok(Value::Int(Utc::now().timestamp()))
    });
    registry.register("Date.format", |args| {
        let timestamp = integer(args, 0);
        let format = if args.len() > 1 {
            text(args, 1)
        } else {
            "%d/%m/%Y".to_string()
        };
        Ok(Value::string(format_timestamp(timestamp, &format)))
    });
    registry.register("Date.parse", |args| {
        Ok(Value::Int(parse_date(&text(args, 0))))
    });
    registry.register("Date.before", |args| {
        Ok(Value::Bool(integer(args, 0) < integer(args, 1)))
    });
    registry.register("Date.after", |args| {
        Ok(Value::Bool(integer(args, 0) > integer(args, 1)))
    });
    registry.register("Date.year", |args| {
        Ok(Value::Int(
            local_datetime(integer(args, 0))
                .map(|dt| dt.year() as i64)
                .unwrap_or(0),
        ))
    });
    registry.register("Date.month", |args| {
        Ok(Value::Int(
            local_datetime(integer(args, 0))
                .map(|dt| dt.month() as i64)
                .unwrap_or(0),
        ))
    });
    registry.register("Date.day", |args| {
        Ok(Value::Int(
            local_datetime(integer(args, 0))
                .map(|dt| dt.day() as i64)
                .unwrap_or(0),
        ))
    });
}

fn local_datetime(timestamp: i64) -> Option<chrono::DateTime<Local>> {
    Local.timestamp_opt(timestamp, 0).single()
}

fn java_to_strftime(format: &str) -> String {
    format
        .replace("yyyy", "%Y")
        .replace("MM", "%m")
        .replace("dd", "%d")
        .replace("HH", "%H")
        .replace("mm", "%M")
        .replace("ss", "%S")
}

fn format_timestamp(timestamp: i64, format: &str) -> String {
    let Some(datetime) = local_datetime(timestamp) else {
        return String::new();
    };
    let converted = java_to_strftime(format);
    let items: Vec<Item> = StrftimeItems::new(&converted).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return String::new();
    }
    datetime.format_with_items(items.into_iter()).to_string()
}

/// Positional dd/MM/yyyy parsing; malformed input yields 0.
fn parse_date(date: &str) -> i64 {
    if date.len() < 10 {
        return 0;
    }
    let (Some(day), Some(month), Some(year)) = (
        date.get(0..2).and_then(|s| s.parse().ok()),
        date.get(3..5).and_then(|s| s.parse().ok()),
        date.get(6..10).and_then(|s| s.parse().ok()),
    ) else {
        return 0;
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| Local.from_local_datetime(&dt).single())
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}
