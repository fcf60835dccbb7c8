use std::collections::HashMap;

use crate::value::Value;

type Scope = HashMap<String, Value>;

/// Global frame plus a stack of function/block scopes.
///
/// `set_var` updates the closest enclosing frame that already binds the
/// name (globals included); only when no binding exists does it create one
/// in the innermost frame, or in globals when the stack is empty.
/// `define` always binds in the innermost frame and is used for fresh
/// bindings such as parameters, `self`, loop variables and catch
/// variables.
#[derive(Debug, Default)]
pub struct Environment {
    globals: Scope,
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn set_var(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if scope.contains_key(name) {
                scope.insert(name.to_string(), value);
                return;
            }
        }
        if self.globals.contains_key(name) {
            self.globals.insert(name.to_string(), value);
            return;
        }
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string(), value);
            }
            None => {
                self.globals.insert(name.to_string(), value);
            }
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string(), value);
            }
            None => {
                self.globals.insert(name.to_string(), value);
            }
        }
    }

    /// Searches from the innermost frame outward, then globals. Unbound
    /// names resolve to Null.
    pub fn get_var(&self, name: &str) -> Value {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return value.clone();
            }
        }
        self.globals.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.contains_key(name))
            || self.globals.contains_key(name)
    }
}
