use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::{text, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("File.read", |args| {
        Ok(Value::string(
            fs::read_to_string(text(args, 0)).unwrap_or_default(),
        ))
    });
    registry.register("File.write", |args| {
        Ok(Value::Bool(fs::write(text(args, 0), text(args, 1)).is_ok()))
    });
    registry.register("File.append", |args| {
        let ok = OpenOptions::new()
            .create(true)
            .append(true)
            .open(text(args, 0))
            .and_then(|mut file| file.write_all(text(args, 1).as_bytes()))
            .is_ok();
        Ok(Value::Bool(ok))
    });
    registry.register("File.exists", |args| {
        Ok(Value::Bool(Path::new(&text(args, 0)).exists()))
    });

    registry.register("Path.join", |args| {
        let mut result = String::new();
        for (i, part) in args.iter().enumerate() {
            if i > 0 && !result.is_empty() && !result.ends_with('/') && !result.ends_with('\\') {
                result.push('/');
            }
            if let Value::String(s) = part {
                result.push_str(s);
            }
        }
        Ok(Value::string(result))
    });
    registry.register("Path.dirname", |args| {
        let path = text(args, 0);
        Ok(Value::string(
            path.rfind(['/', '\\']).map(|p| &path[..p]).unwrap_or(""),
        ))
    });
    registry.register("Path.basename", |args| {
        let path = text(args, 0);
        Ok(Value::string(match path.rfind(['/', '\\']) {
            Some(p) => path[p + 1..].to_string(),
            None => path,
        }))
    });
    registry.register("Path.extension", |args| {
        let path = text(args, 0);
        // Includes the dot: "a/b.txt" -> ".txt"
        Ok(Value::string(
            path.rfind('.').map(|p| &path[p..]).unwrap_or(""),
        ))
    });

    registry.register("CSV.parse", |args| {
        let content = text(args, 0);
        let delim = delimiter(args);
        Ok(parse_csv(&content, &delim, false))
    });
    registry.register("CSV.readFile", |args| {
        let Ok(content) = fs::read_to_string(text(args, 0)) else {
            return Ok(Value::Array(Vec::new()));
        };
        let delim = delimiter(args);
        Ok(parse_csv(&content, &delim, true))
    });
}

fn delimiter(args: &[Value]) -> String {
    if args.len() > 1 {
        let d = text(args, 1);
        if !d.is_empty() {
            return d;
        }
    }
    ",".to_string()
}

fn parse_csv(content: &str, delim: &str, trim_cells: bool) -> Value {
    let mut rows = Vec::new();
    for line in content.lines() {
        let cells = line
            .split(delim)
            .map(|cell| {
                if trim_cells {
                    Value::string(cell.trim_matches([' ', '\t']))
                } else {
                    Value::string(cell)
                }
            })
            .collect();
        rows.push(Value::Array(cells));
    }
    Value::Array(rows)
}
