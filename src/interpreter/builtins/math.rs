use super::{arg, number, Registry};
use crate::value::Value;

pub fn install(registry: &mut Registry) {
    registry.register("Math.sqrt", |args| Ok(Value::Double(number(args, 0).sqrt())));
    registry.register("Math.pow", |args| {
        Ok(Value::Double(number(args, 0).powf(number(args, 1))))
    });
    registry.register("Math.abs", |args| {
        Ok(match arg(args, 0) {
            Value::Int(n) => Value::Int(n.saturating_abs()),
            other => Value::Double(other.as_double().abs()),
        })
    });
    registry.register("Math.max", |args| {
        Ok(Value::Double(number(args, 0).max(number(args, 1))))
    });
    registry.register("Math.min", |args| {
        Ok(Value::Double(number(args, 0).min(number(args, 1))))
    });
    registry.register("Math.floor", |args| {
        Ok(Value::Int(number(args, 0).floor() as i64))
    });
    registry.register("Math.ceil", |args| {
        Ok(Value::Int(number(args, 0).ceil() as i64))
    });
    registry.register("Math.round", |args| {
        Ok(Value::Int(number(args, 0).round() as i64))
    });
    registry.register("Math.sin", |args| Ok(Value::Double(number(args, 0).sin())));
    registry.register("Math.cos", |args| Ok(Value::Double(number(args, 0).cos())));
    registry.register("Math.tan", |args| Ok(Value::Double(number(args, 0).tan())));
    registry.register("Math.log", |args| Ok(Value::Double(number(args, 0).ln())));
    registry.register("Math.log10", |args| {
        Ok(Value::Double(number(args, 0).log10()))
    });
    registry.register("Math.exp", |args| Ok(Value::Double(number(args, 0).exp())));
    registry.register("Math.random", |_args| {
        Ok(Value::Double(rand::random::<f64>()))
    });
    registry.register("Math.PI", |_args| Ok(Value::Double(std::f64::consts::PI)));
    registry.register("Math.E", |_args| Ok(Value::Double(std::f64::consts::E)));
}
