use super::super::error::OmniError;
use super::{arg, integer, text, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("len", |args| {
        Ok(match args.first() {
            Some(Value::String(s)) => Value::Int(s.len() as i64),
            Some(Value::Array(items)) => Value::Int(items.len() as i64),
            _ => Value::Int(0),
        })
    });
    registry.register("str", |args| Ok(Value::string(arg(args, 0).render())));
    registry.register("int", |args| Ok(Value::Int(arg(args, 0).as_int())));
    registry.register("float", |args| Ok(Value::Double(arg(args, 0).as_double())));
    registry.register("typeof", |args| Ok(Value::string(arg(args, 0).type_name())));

    registry.register("String.length", |args| {
        Ok(Value::Int(text(args, 0).len() as i64))
    });
    registry.register("String.toUpperCase", |args| {
        Ok(Value::string(text(args, 0).to_uppercase()))
    });
    registry.register("String.toLowerCase", |args| {
        Ok(Value::string(text(args, 0).to_lowercase()))
    });
    registry.register("String.substring", substring);
    registry.register("String.indexOf", |args| {
        let haystack = text(args, 0);
        let needle = text(args, 1);
        Ok(Value::Int(
            haystack.find(&needle).map(|p| p as i64).unwrap_or(-1),
        ))
    });
    registry.register("String.contains", |args| {
        Ok(Value::Bool(text(args, 0).contains(&text(args, 1))))
    });
    registry.register("String.startsWith", |args| {
        Ok(Value::Bool(text(args, 0).starts_with(&text(args, 1))))
    });
    registry.register("String.endsWith", |args| {
        Ok(Value::Bool(text(args, 0).ends_with(&text(args, 1))))
    });
    registry.register("String.replace", |args| {
        let s = text(args, 0);
        let from = text(args, 1);
        if from.is_empty() {
            return Ok(Value::string(s));
        }
        Ok(Value::string(s.replace(&from, &text(args, 2))))
    });
    registry.register("String.trim", |args| {
        Ok(Value::string(text(args, 0).trim()))
    });
    registry.register("String.split", split);
    registry.register("String.charAt", |args| {
        let s = text(args, 0);
        let index = integer(args, 1);
        let ch = usize::try_from(index)
            .ok()
            .and_then(|i| s.chars().nth(i));
        Ok(match ch {
            Some(c) => Value::string(c.to_string()),
            None => Value::string(""),
        })
    });
    registry.register("String.format", format_string);
    registry.register("String.isEmpty", |args| {
        Ok(Value::Bool(text(args, 0).is_empty()))
    });
    registry.register("String.equals", |args| {
        Ok(Value::Bool(text(args, 0) == text(args, 1)))
    });
    registry.register("String.equalsIgnoreCase", |args| {
        Ok(Value::Bool(
            text(args, 0).to_lowercase() == text(args, 1).to_lowercase(),
        ))
    });

    registry.register("Integer.parseInt", |args| {
        Ok(Value::Int(text(args, 0).trim().parse().unwrap_or(0)))
    });
    registry.register("Double.parseDouble", |args| {
        Ok(Value::Double(text(args, 0).trim().parse().unwrap_or(0.0)))
    });
}

fn substring(args: &[Value]) -> Result<Value, OmniError> {
    let chars: Vec<char> = text(args, 0).chars().collect();
    let start = usize::try_from(integer(args, 1)).unwrap_or(0).min(chars.len());
    let end = if args.len() > 2 {
        usize::try_from(integer(args, 2))
            .unwrap_or(0)
            .clamp(start, chars.len())
    } else {
        chars.len()
    };
    Ok(Value::string(chars[start..end].iter().collect::<String>()))
}

fn split(args: &[Value]) -> Result<Value, OmniError> {
    let s = text(args, 0);
    let delim = if args.len() > 1 {
        text(args, 1)
    } else {
        " ".to_string()
    };
    if delim.is_empty() {
        return Ok(Value::Array(vec![Value::string(s)]));
    }
    let parts = s.split(&delim).map(Value::string).collect();
    Ok(Value::Array(parts))
}

/// Java-style `String.format`: `%[-][width][.precision](s|d|f)` plus `%n`.
fn format_string(args: &[Value]) -> Result<Value, OmniError> {
    if args.is_empty() {
        return Ok(Value::string(""));
    }
    let format = text(args, 0);
    let chars: Vec<char> = format.chars().collect();
    let mut result = String::new();
    let mut arg_index = 1;
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '%' || i + 1 >= chars.len() || arg_index >= args.len() {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        i += 1;

        let mut left_align = false;
        if chars[i] == '-' {
            left_align = true;
            i += 1;
        }
        let mut width = 0usize;
        while i < chars.len() && chars[i].is_ascii_digit() {
            width = width * 10 + chars[i].to_digit(10).unwrap() as usize;
            i += 1;
        }
        let mut precision = None;
        if i < chars.len() && chars[i] == '.' {
            i += 1;
            let mut p = 0usize;
            while i < chars.len() && chars[i].is_ascii_digit() {
                p = p * 10 + chars[i].to_digit(10).unwrap() as usize;
                i += 1;
            }
            precision = Some(p);
        }

        if i >= chars.len() {
            break;
        }
        let spec = chars[i];
        let mut rendered = match spec {
            's' => args[arg_index].render(),
            'd' => args[arg_index].as_int().to_string(),
            'f' => match precision {
                Some(p) => format!("{:.*}", p, args[arg_index].as_double()),
                None => args[arg_index].as_double().to_string(),
            },
            'n' => {
                result.push('\n');
                i += 1;
                continue;
            }
            _ => {
                let raw: String = chars[start..=i].iter().collect();
                result.push_str(&raw);
                arg_index += 1;
                i += 1;
                continue;
            }
        };

        if width > 0 && rendered.len() < width {
            let pad = " ".repeat(width - rendered.len());
            if left_align {
                rendered.push_str(&pad);
            } else {
                rendered = format!("{}{}", pad, rendered);
            }
        }
        result.push_str(&rendered);
        arg_index += 1;
        i += 1;
    }

    Ok(Value::string(result))
}
