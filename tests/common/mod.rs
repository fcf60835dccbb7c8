#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use omni::interpreter::{parse_program, Interpreter, OmniError, Registry};
use omni::Value;

/// Runs a program with `print`/`println` redirected into a buffer,
/// returning `main`'s result alongside everything printed.
pub fn run_capture(source: &str) -> (Result<Value, OmniError>, String) {
    let output = Rc::new(RefCell::new(String::new()));
    let mut registry = Registry::standard();

    let sink = output.clone();
    let capture = move |args: &[Value]| {
        let rendered: Vec<String> = args.iter().map(Value::render).collect();
        let mut buffer = sink.borrow_mut();
        buffer.push_str(&rendered.join(" "));
        buffer.push('\n');
        Ok(Value::Null)
    };
    registry.register("print", capture.clone());
    registry.register("println", capture);

    let (program, diagnostics) = parse_program(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        diagnostics
    );

    let result = Interpreter::with_registry(registry).execute(&program);
    let printed = output.borrow().clone();
    (result, printed)
}

/// Output of a program expected to succeed.
pub fn run_output(source: &str) -> String {
    let (result, output) = run_capture(source);
    result.expect("program failed");
    output
}

/// Result of a program expected to succeed.
pub fn run_value(source: &str) -> Value {
    let (result, _) = run_capture(source);
    result.expect("program failed")
}

/// The error of a program expected to fail.
pub fn run_error(source: &str) -> OmniError {
    let (result, _) = run_capture(source);
    result.expect_err("program unexpectedly succeeded")
}
