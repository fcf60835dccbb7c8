use std::io::{self, BufRead, Write};

use super::super::error::OmniError;
use super::{text, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("print", print);
    registry.register("println", print);
    registry.register("printf", printf);
    registry.register("input", input);
}

/// Space-joined arguments followed by a newline, flushed immediately.
fn print(args: &[Value]) -> Result<Value, OmniError> {
    let rendered: Vec<String> = args.iter().map(Value::render).collect();
    println!("{}", rendered.join(" "));
    io::stdout().flush().ok();
    Ok(Value::Null)
}

/// C-flavored formatting with %d/%i, %f and %s.
fn printf(args: &[Value]) -> Result<Value, OmniError> {
    if args.is_empty() {
        return Ok(Value::Null);
    }
    let format = text(args, 0);
    let chars: Vec<char> = format.chars().collect();
    let mut result = String::new();
    let mut arg_index = 1;
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' && i + 1 < chars.len() && arg_index < args.len() {
            let spec = chars[i + 1];
            match spec {
                'd' | 'i' => result.push_str(&args[arg_index].as_int().to_string()),
                'f' => result.push_str(&format!("{:.6}", args[arg_index].as_double())),
                's' => result.push_str(&args[arg_index].render()),
                other => {
                    result.push('%');
                    result.push(other);
                }
            }
            arg_index += 1;
            i += 2;
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }
    print!("{}", result);
    io::stdout().flush().ok();
    Ok(Value::Null)
}

fn input(args: &[Value]) -> Result<Value, OmniError> {
    if let Some(prompt) = args.first() {
        print!("{}", prompt.render());
        io::stdout().flush().ok();
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| OmniError::message(format!("Failed to read input: {}", e)))?;
    let line = line.trim_end_matches(['\n', '\r']);
    Ok(Value::string(line))
}
