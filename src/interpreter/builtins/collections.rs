use indexmap::IndexMap;

use super::super::error::OmniError;
use super::{arg, integer, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("range", range);

    // Lists are immutable-style: mutators return the updated copy.
    registry.register("List.new", |_args| Ok(Value::Array(Vec::new())));
    registry.register("List.add", |args| {
        Ok(match arg(args, 0) {
            Value::Array(mut items) => {
                items.push(arg(args, 1));
                Value::Array(items)
            }
            other => other,
        })
    });
    registry.register("List.get", |args| {
        Ok(match args.first() {
            Some(Value::Array(items)) => usize::try_from(integer(args, 1))
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::Null),
            _ => Value::Null,
        })
    });
    registry.register("List.set", |args| {
        Ok(match arg(args, 0) {
            Value::Array(mut items) => {
                if let Some(slot) = usize::try_from(integer(args, 1))
                    .ok()
                    .and_then(|i| items.get_mut(i))
                {
                    *slot = arg(args, 2);
                }
                Value::Array(items)
            }
            other => other,
        })
    });
    registry.register("List.size", |args| {
        Ok(match args.first() {
            Some(Value::Array(items)) => Value::Int(items.len() as i64),
            _ => Value::Int(0),
        })
    });
    registry.register("List.isEmpty", |args| {
        Ok(match args.first() {
            Some(Value::Array(items)) => Value::Bool(items.is_empty()),
            _ => Value::Bool(true),
        })
    });
    registry.register("List.remove", |args| {
        Ok(match arg(args, 0) {
            Value::Array(mut items) => {
                if let Ok(i) = usize::try_from(integer(args, 1)) {
                    if i < items.len() {
                        items.remove(i);
                    }
                }
                Value::Array(items)
            }
            other => other,
        })
    });
    registry.register("List.contains", |args| {
        let needle = arg(args, 1);
        Ok(match args.first() {
            Some(Value::Array(items)) => {
                Value::Bool(items.iter().any(|item| same_scalar(item, &needle)))
            }
            _ => Value::Bool(false),
        })
    });
    registry.register("List.indexOf", |args| {
        let needle = arg(args, 1);
        Ok(match args.first() {
            Some(Value::Array(items)) => {
                let found = items.iter().position(|item| {
                    matches!(
                        (item, &needle),
                        (Value::String(_), Value::String(_)) | (Value::Int(_), Value::Int(_))
                    ) && same_scalar(item, &needle)
                });
                Value::Int(found.map(|i| i as i64).unwrap_or(-1))
            }
            _ => Value::Int(-1),
        })
    });

    // Maps are bare objects without a class tag.
    registry.register("Map.new", |_args| Ok(Value::Object(IndexMap::new())));
    registry.register("Map.put", |args| {
        Ok(match arg(args, 0) {
            Value::Object(mut map) => {
                map.insert(arg(args, 1).render(), arg(args, 2));
                Value::Object(map)
            }
            other => other,
        })
    });
    registry.register("Map.get", |args| {
        let key = arg(args, 1).render();
        Ok(match args.first() {
            Some(Value::Object(map)) => map.get(&key).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        })
    });
    registry.register("Map.containsKey", |args| {
        let key = arg(args, 1).render();
        Ok(match args.first() {
            Some(Value::Object(map)) => Value::Bool(map.contains_key(&key)),
            _ => Value::Bool(false),
        })
    });
    registry.register("Map.keys", |args| {
        Ok(match args.first() {
            Some(Value::Object(map)) => {
                Value::Array(map.keys().map(Value::string).collect())
            }
            _ => Value::Array(Vec::new()),
        })
    });
    registry.register("Map.size", |args| {
        Ok(match args.first() {
            Some(Value::Object(map)) => Value::Int(map.len() as i64),
            _ => Value::Int(0),
        })
    });
}

/// `range(end)`, `range(start, end)` or `range(start, end, step)`, yielding
/// Ints. Non-positive steps produce an empty array.
fn range(args: &[Value]) -> Result<Value, OmniError> {
    let (start, end) = match args.len() {
        0 => (0, 0),
        1 => (0, integer(args, 0)),
        _ => (integer(args, 0), integer(args, 1)),
    };
    let step = if args.len() >= 3 { integer(args, 2) } else { 1 };
    if step <= 0 {
        return Ok(Value::Array(Vec::new()));
    }

    let mut items = Vec::new();
    let mut i = start;
    while i < end {
        items.push(Value::Int(i));
        i += step;
    }
    Ok(Value::Array(items))
}

/// Same-variant comparison over the scalar kinds only; arrays, objects
/// and lambdas never compare equal here.
fn same_scalar(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Double(x), Value::Double(y)) => x == y,
        _ => false,
    }
}
