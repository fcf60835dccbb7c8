use std::time::Duration;

use super::{integer, text, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("System.exit", |args| {
        let code = integer(args, 0) as i32;
        std::process::exit(code)
    });
    registry.register("System.getenv", |args| {
        Ok(Value::string(
            std::env::var(text(args, 0)).unwrap_or_default(),
        ))
    });
    registry.register("System.sleep", |args| {
        let millis = integer(args, 0).max(0) as u64;
        std::thread::sleep(Duration::from_millis(millis));
        Ok(Value::Null)
    });
}
