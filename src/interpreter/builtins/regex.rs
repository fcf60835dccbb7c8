//! Regular-expression built-ins.
//!
//! Invalid patterns never raise: each function falls back to the neutral
//! value of its result type, so scripts stay total.

use regex::Regex;

use super::{text, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("Regex.matches", |args| {
        // Whole-string match.
        let anchored = format!("^(?:{})$", text(args, 1));
        Ok(Value::Bool(match Regex::new(&anchored) {
            Ok(re) => re.is_match(&text(args, 0)),
            Err(_) => false,
        }))
    });
    registry.register("Regex.search", |args| {
        Ok(Value::Bool(match Regex::new(&text(args, 1)) {
            Ok(re) => re.is_match(&text(args, 0)),
            Err(_) => false,
        }))
    });
    registry.register("Regex.find", |args| {
        let position = Regex::new(&text(args, 1))
            .ok()
            .and_then(|re| re.find(&text(args, 0)).map(|m| m.start() as i64));
        Ok(Value::Int(position.unwrap_or(-1)))
    });
    registry.register("Regex.findAll", |args| {
        let haystack = text(args, 0);
        let matches = match Regex::new(&text(args, 1)) {
            Ok(re) => re
                .find_iter(&haystack)
                .map(|m| Value::string(m.as_str()))
                .collect(),
            Err(_) => Vec::new(),
        };
        Ok(Value::Array(matches))
    });
    registry.register("Regex.replace", |args| {
        let haystack = text(args, 0);
        Ok(Value::string(match Regex::new(&text(args, 1)) {
            Ok(re) => re.replace_all(&haystack, text(args, 2).as_str()).into_owned(),
            Err(_) => haystack,
        }))
    });
    registry.register("Regex.split", |args| {
        let haystack = text(args, 0);
        let parts = match Regex::new(&text(args, 1)) {
            Ok(re) => re.split(&haystack).map(Value::string).collect(),
            Err(_) => vec![Value::string(haystack)],
        };
        Ok(Value::Array(parts))
    });
    registry.register("Regex.groups", |args| {
        let haystack = text(args, 0);
        let groups = Regex::new(&text(args, 1))
            .ok()
            .and_then(|re| {
                re.captures(&haystack).map(|caps| {
                    (0..caps.len())
                        .map(|i| {
                            Value::string(caps.get(i).map(|m| m.as_str()).unwrap_or(""))
                        })
                        .collect()
                })
            })
            .unwrap_or_default();
        Ok(Value::Array(groups))
    });
}
