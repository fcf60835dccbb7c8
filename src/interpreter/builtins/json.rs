//! Serialization built-ins: JSON through serde_json plus a compact tagged
//! binary format for save/load round-trips.

use std::fs;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use super::{arg, text, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("Serializer.toJSON", |args| {
        let json = value_to_json(&arg(args, 0));
        Ok(Value::string(
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "null".to_string()),
        ))
    });
    registry.register("Serializer.fromJSON", |args| {
        Ok(match serde_json::from_str::<JsonValue>(&text(args, 0)) {
            Ok(json) => json_to_value(&json),
            Err(_) => Value::Null,
        })
    });
    registry.register("Serializer.saveJSON", |args| {
        let json = value_to_json(&arg(args, 1));
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|_| "null".to_string());
        Ok(Value::Bool(fs::write(text(args, 0), rendered).is_ok()))
    });
    registry.register("Serializer.loadJSON", |args| {
        let Ok(content) = fs::read_to_string(text(args, 0)) else {
            return Ok(Value::Null);
        };
        Ok(match serde_json::from_str::<JsonValue>(&content) {
            Ok(json) => json_to_value(&json),
            Err(_) => Value::Null,
        })
    });
    registry.register("Serializer.saveBinary", |args| {
        let mut bytes = Vec::new();
        encode(&arg(args, 1), &mut bytes);
        Ok(Value::Bool(fs::write(text(args, 0), bytes).is_ok()))
    });
    registry.register("Serializer.loadBinary", |args| {
        let Ok(bytes) = fs::read(text(args, 0)) else {
            return Ok(Value::Null);
        };
        let mut pos = 0;
        Ok(decode(&bytes, &mut pos).unwrap_or(Value::Null))
    });
}

pub(crate) fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null | Value::Lambda(_) => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(n) => JsonValue::Number((*n).into()),
        Value::Double(d) => Number::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.to_string()),
        Value::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Object(map) => {
            let mut object = JsonMap::new();
            for (key, val) in map {
                object.insert(key.clone(), value_to_json(val));
            }
            JsonValue::Object(object)
        }
    }
}

pub(crate) fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Double(n.as_f64().unwrap_or(0.0)),
        },
        JsonValue::String(s) => Value::string(s),
        JsonValue::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        JsonValue::Object(object) => {
            let mut map = IndexMap::new();
            for (key, val) in object {
                map.insert(key.clone(), json_to_value(val));
            }
            Value::Object(map)
        }
    }
}

// Binary layout: a tag byte, then a payload. Lengths are u64 LE.
const TAG_NULL: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_DOUBLE: u8 = 2;
const TAG_BOOL: u8 = 3;
const TAG_STRING: u8 = 4;
const TAG_ARRAY: u8 = 5;
const TAG_OBJECT: u8 = 6;

fn encode(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null | Value::Lambda(_) => out.push(TAG_NULL),
        Value::Int(n) => {
            out.push(TAG_INT);
            out.extend_from_slice(&n.to_le_bytes());
        }
        Value::Double(d) => {
            out.push(TAG_DOUBLE);
            out.extend_from_slice(&d.to_le_bytes());
        }
        Value::Bool(b) => {
            out.push(TAG_BOOL);
            out.push(*b as u8);
        }
        Value::String(s) => {
            out.push(TAG_STRING);
            encode_bytes(s.as_bytes(), out);
        }
        Value::Array(items) => {
            out.push(TAG_ARRAY);
            out.extend_from_slice(&(items.len() as u64).to_le_bytes());
            for item in items {
                encode(item, out);
            }
        }
        Value::Object(map) => {
            out.push(TAG_OBJECT);
            out.extend_from_slice(&(map.len() as u64).to_le_bytes());
            for (key, val) in map {
                encode_bytes(key.as_bytes(), out);
                encode(val, out);
            }
        }
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(bytes);
}

fn decode(bytes: &[u8], pos: &mut usize) -> Option<Value> {
    let tag = *bytes.get(*pos)?;
    *pos += 1;
    match tag {
        TAG_NULL => Some(Value::Null),
        TAG_INT => {
            let raw = read_array::<8>(bytes, pos)?;
            Some(Value::Int(i64::from_le_bytes(raw)))
        }
        TAG_DOUBLE => {
            let raw = read_array::<8>(bytes, pos)?;
            Some(Value::Double(f64::from_le_bytes(raw)))
        }
        TAG_BOOL => {
            let b = *bytes.get(*pos)?;
            *pos += 1;
            Some(Value::Bool(b != 0))
        }
        TAG_STRING => {
            let raw = read_chunk(bytes, pos)?;
            Some(Value::string(String::from_utf8_lossy(raw)))
        }
        TAG_ARRAY => {
            let len = read_len(bytes, pos)?;
            let mut items = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                items.push(decode(bytes, pos)?);
            }
            Some(Value::Array(items))
        }
        TAG_OBJECT => {
            let len = read_len(bytes, pos)?;
            let mut map = IndexMap::new();
            for _ in 0..len {
                let key = String::from_utf8_lossy(read_chunk(bytes, pos)?).into_owned();
                map.insert(key, decode(bytes, pos)?);
            }
            Some(Value::Object(map))
        }
        _ => None,
    }
}

fn read_array<const N: usize>(bytes: &[u8], pos: &mut usize) -> Option<[u8; N]> {
    let slice = bytes.get(*pos..*pos + N)?;
    *pos += N;
    slice.try_into().ok()
}

fn read_len(bytes: &[u8], pos: &mut usize) -> Option<usize> {
    let raw = read_array::<8>(bytes, pos)?;
    usize::try_from(u64::from_le_bytes(raw)).ok()
}

fn read_chunk<'a>(bytes: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let len = read_len(bytes, pos)?;
    let chunk = bytes.get(*pos..*pos + len)?;
    *pos += len;
    Some(chunk)
}
