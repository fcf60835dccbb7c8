//! Built-in function registry.
//!
//! The evaluator sees the standard library purely as a name-keyed table
//! of native callables: `has(name)` and `call(name, args)`. Dotted names
//! (`Math.sqrt`, `File.read`) live in the same namespace as bare ones
//! (`print`, `range`). The registry is an injected collaborator, so tests
//! replace entries (for example `print`) to observe program output.
//!
//! Functions are organized into categories:
//! - **io**: print, println, printf, input
//! - **math**: `Math.*`
//! - **string**: `String.*`, len, str, int, float, typeof, parse helpers
//! - **collections**: range, `List.*`, `Map.*`
//! - **fs**: `File.*`, `Path.*`, `CSV.*`
//! - **regex**: `Regex.*`
//! - **datetime**: `Date.*`
//! - **json**: `Serializer.*`
//! - **system**: `System.*`

pub mod collections;
pub mod datetime;
pub mod fs;
pub mod io;
pub mod json;
pub mod math;
pub mod regex;
pub mod string;
pub mod system;

use indexmap::IndexMap;

use super::error::OmniError;
use crate::value::Value;

pub type NativeFn = Box<dyn Fn(&[Value]) -> Result<Value, OmniError>>;

pub struct Registry {
    funcs: IndexMap<String, NativeFn>,
}

impl Registry {
    /// A registry with no entries; useful as a base for stubs.
    pub fn empty() -> Self {
        Self {
            funcs: IndexMap::new(),
        }
    }

    /// The full standard catalog.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        io::install(&mut registry);
        math::install(&mut registry);
        string::install(&mut registry);
        collections::install(&mut registry);
        fs::install(&mut registry);
        regex::install(&mut registry);
        datetime::install(&mut registry);
        json::install(&mut registry);
        system::install(&mut registry);
        registry
    }

    /// Registers or replaces a native function.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&[Value]) -> Result<Value, OmniError> + 'static,
    {
        self.funcs.insert(name.into(), Box::new(func));
    }

    pub fn has(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, OmniError> {
        match self.funcs.get(name) {
            Some(func) => func(args),
            None => Err(OmniError::message(format!("Unknown function: {}", name))),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.funcs.keys().map(String::as_str)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

// Argument accessors shared by the category modules. Coercion is lenient:
// missing slots and wrong payloads read as the type's zero value, so
// built-ins never fault on arity.

pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Null)
}

pub(crate) fn text(args: &[Value], index: usize) -> String {
    match args.get(index) {
        Some(Value::String(s)) => s.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn number(args: &[Value], index: usize) -> f64 {
    args.get(index).map(Value::as_double).unwrap_or(0.0)
}

pub(crate) fn integer(args: &[Value], index: usize) -> i64 {
    args.get(index).map(Value::as_int).unwrap_or(0)
}
