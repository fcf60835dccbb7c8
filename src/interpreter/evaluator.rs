//! Tree-walking evaluator.
//!
//! The interpreter aggregate owns the scope stack, the class and function
//! tables, the set of loaded modules and the injected built-in registry.
//! Statements complete through the [`Exec`] model; raised exceptions
//! travel as the `Err` arm and unwind to the nearest `try`/`catch`.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{ClassDecl, Expr, ExprKind, Function, Program, Stmt, StmtKind};
use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::value::{LambdaValue, Value, CLASS_KEY};

use super::builtins::Registry;
use super::control_flow::Exec;
use super::environment::Environment;
use super::error::OmniError;
use super::parser::Parser;

/// One step of an assignment target: `.name` or `[index]`.
#[derive(Debug, Clone)]
enum PathSegment {
    Member(String),
    Index(i64),
}

pub struct Interpreter {
    env: Environment,
    functions: HashMap<String, Rc<Function>>,
    classes: HashMap<String, Rc<ClassDecl>>,
    imported_modules: HashSet<String>,
    registry: Registry,
    current_line: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_registry(Registry::standard())
    }

    /// Builds an interpreter around an injected built-in registry. Tests
    /// stub the registry to observe output.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            env: Environment::new(),
            functions: HashMap::new(),
            classes: HashMap::new(),
            imported_modules: HashSet::new(),
            registry,
            current_line: 0,
        }
    }

    /// Processes imports, registers every class and top-level function,
    /// then locates and invokes `main`.
    pub fn execute(&mut self, program: &Program) -> Result<Value, OmniError> {
        for import in &program.imports {
            self.process_import(&import.module)?;
        }
        for class in &program.classes {
            self.classes
                .insert(class.name.clone(), Rc::new(class.clone()));
        }
        for function in &program.functions {
            self.functions
                .insert(function.name.clone(), Rc::new(function.clone()));
        }

        match self.functions.get("main").cloned() {
            Some(main) => self.call_function(&main, Vec::new()),
            None => Err(OmniError::new("No main() function found", 0)),
        }
    }

    /// Loads a module at most once: reads the named file, runs the lexer
    /// and parser on it, and merges its classes and non-`main` functions
    /// into the interpreter tables.
    pub fn process_import(&mut self, module: &str) -> Result<(), OmniError> {
        if !self.imported_modules.insert(module.to_string()) {
            return Ok(());
        }

        let source = std::fs::read_to_string(module)
            .map_err(|_| OmniError::import_failure(module, self.current_line))?;
        let (program, _diagnostics) = parse_program(&source);

        for function in program.functions {
            if function.name != "main" {
                self.functions
                    .insert(function.name.clone(), Rc::new(function));
            }
        }
        for class in program.classes {
            self.classes.insert(class.name.clone(), Rc::new(class));
        }
        Ok(())
    }

    //===------------------------------------------------------------===//
    // Functions
    //===------------------------------------------------------------===//

    fn call_function(&mut self, func: &Function, args: Vec<Value>) -> Result<Value, OmniError> {
        self.env.push_scope();
        for (i, param) in func.args.iter().enumerate() {
            if param.name == "self" {
                continue;
            }
            if let Some(value) = args.get(i) {
                self.env.define(&param.name, value.clone());
            }
        }
        let outcome = self.run_body(&func.body);
        self.env.pop_scope();
        outcome
    }

    /// Runs a function body. The result is the value of the last executed
    /// statement unless a `return` short-circuits.
    fn run_body(&mut self, body: &[Stmt]) -> Result<Value, OmniError> {
        let mut result = Value::Null;
        for stmt in body {
            match self.exec_stmt(stmt)? {
                Exec::Normal(value) => result = value,
                Exec::Return(value) => return Ok(value),
                Exec::Break | Exec::Continue => {
                    return Err(OmniError::new(
                        "break or continue outside of loop",
                        self.current_line,
                    ));
                }
            }
        }
        Ok(result)
    }

    //===------------------------------------------------------------===//
    // Statements
    //===------------------------------------------------------------===//

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Exec, OmniError> {
        if stmt.line > 0 {
            self.current_line = stmt.line;
        }

        match &stmt.kind {
            StmtKind::Expr(expr) => Ok(Exec::Normal(self.eval_expr(expr)?)),

            StmtKind::VarDecl { name, init, .. } => {
                let value = match init {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                self.env.set_var(name, value.clone());
                Ok(Exec::Normal(value))
            }

            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(value)?;
                self.assign_target(target, value)?;
                Ok(Exec::Normal(Value::Null))
            }

            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Null,
                };
                Ok(Exec::Return(value))
            }

            StmtKind::If {
                condition,
                then_body,
                else_body,
            } => {
                let flow = if self.eval_expr(condition)?.truthy() {
                    self.exec_block(then_body)?
                } else if !else_body.is_empty() {
                    self.exec_block(else_body)?
                } else {
                    Exec::Normal(Value::Null)
                };
                Ok(match flow {
                    Exec::Normal(_) => Exec::Normal(Value::Null),
                    other => other,
                })
            }

            StmtKind::While { condition, body } => {
                while self.eval_expr(condition)?.truthy() {
                    match self.exec_block(body)? {
                        Exec::Return(value) => return Ok(Exec::Return(value)),
                        Exec::Break => break,
                        Exec::Continue | Exec::Normal(_) => {}
                    }
                }
                Ok(Exec::Normal(Value::Null))
            }

            StmtKind::For {
                var,
                iterable,
                body,
            } => {
                let iterable = self.eval_expr(iterable)?;
                // Only arrays iterate; any other value is a silent no-op.
                if let Value::Array(items) = iterable {
                    for item in items {
                        self.env.push_scope();
                        self.env.define(var, item);
                        let flow = self.exec_stmts(body);
                        self.env.pop_scope();
                        match flow? {
                            Exec::Return(value) => return Ok(Exec::Return(value)),
                            Exec::Break => break,
                            Exec::Continue | Exec::Normal(_) => {}
                        }
                    }
                }
                Ok(Exec::Normal(Value::Null))
            }

            StmtKind::TryCatch {
                try_body,
                exception_var,
                catch_body,
                finally_body,
                ..
            } => {
                // Try, catch and finally each run in their own scope; the
                // try frame is gone before the catch frame is pushed.
                self.env.push_scope();
                let mut outcome = self.exec_stmts(try_body);
                self.env.pop_scope();

                if let Err(raised) = &outcome {
                    let message = raised.message.clone();
                    self.env.push_scope();
                    self.env.define(exception_var, Value::string(message));
                    outcome = self.exec_stmts(catch_body);
                    self.env.pop_scope();
                }

                // The finally body runs on every exit path; its own
                // non-normal completion takes precedence over the pending
                // one.
                if !finally_body.is_empty() {
                    self.env.push_scope();
                    let finally_flow = self.exec_stmts(finally_body);
                    self.env.pop_scope();
                    match finally_flow? {
                        Exec::Normal(_) => {}
                        other => return Ok(other),
                    }
                }

                match outcome? {
                    Exec::Normal(_) => Ok(Exec::Normal(Value::Null)),
                    other => Ok(other),
                }
            }

            StmtKind::Throw(expr) => {
                let value = self.eval_expr(expr)?;
                Err(OmniError::new(value.render(), self.current_line))
            }

            StmtKind::Break => Ok(Exec::Break),
            StmtKind::Continue => Ok(Exec::Continue),
        }
    }

    fn exec_block(&mut self, body: &[Stmt]) -> Result<Exec, OmniError> {
        self.env.push_scope();
        let flow = self.exec_stmts(body);
        self.env.pop_scope();
        flow
    }

    fn exec_stmts(&mut self, body: &[Stmt]) -> Result<Exec, OmniError> {
        for stmt in body {
            match self.exec_stmt(stmt)? {
                Exec::Normal(_) => {}
                other => return Ok(other),
            }
        }
        Ok(Exec::Normal(Value::Null))
    }

    //===------------------------------------------------------------===//
    // Expressions
    //===------------------------------------------------------------===//

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, OmniError> {
        if expr.line > 0 {
            self.current_line = expr.line;
        }

        match &expr.kind {
            ExprKind::Number(raw) => {
                // Integral literals narrow to Int.
                let truncated = *raw as i64;
                if truncated as f64 == *raw {
                    Ok(Value::Int(truncated))
                } else {
                    Ok(Value::Double(*raw))
                }
            }

            ExprKind::Str(text) => Ok(Value::string(text)),

            ExprKind::FStr(template) => Ok(Value::string(self.interpolate(template))),

            ExprKind::Variable(name) => Ok(match name.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                "null" => Value::Null,
                _ => self.env.get_var(name),
            }),

            ExprKind::SelfRef => Ok(self.env.get_var("self")),

            ExprKind::Binary { op, lhs, rhs } => {
                let left = self.eval_expr(lhs)?;
                let right = self.eval_expr(rhs)?;
                Ok(eval_binary_op(op, &left, &right))
            }

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                Ok(match op.as_str() {
                    "!" => Value::Bool(!value.truthy()),
                    "-" => Value::Double(-value.as_double()),
                    _ => value,
                })
            }

            ExprKind::Call { callee, args } => {
                let evaluated = self.eval_args(args)?;
                self.call_named(callee, evaluated)
            }

            ExprKind::MethodCall {
                object,
                method,
                args,
            } => self.eval_method_call(object, method, args),

            ExprKind::MemberAccess { object, member } => {
                let value = self.eval_expr(object)?;
                Ok(match value {
                    Value::Object(map) => map.get(member).cloned().unwrap_or(Value::Null),
                    _ => Value::Null,
                })
            }

            ExprKind::New { class_name, args } => self.create_object(class_name, args),

            ExprKind::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval_expr(element)?);
                }
                Ok(Value::Array(items))
            }

            ExprKind::Index { container, index } => {
                let container = self.eval_expr(container)?;
                let index = self.eval_expr(index)?.as_int();
                Ok(index_value(&container, index))
            }

            ExprKind::Lambda { params, body } => Ok(Value::Lambda(Rc::new(LambdaValue {
                params: params.clone(),
                body: (**body).clone(),
            }))),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, OmniError> {
        let mut evaluated = Vec::with_capacity(args.len());
        for arg in args {
            evaluated.push(self.eval_expr(arg)?);
        }
        Ok(evaluated)
    }

    /// Resolves a bare call: the built-in registry wins, then user
    /// functions; anything else raises.
    fn call_named(&mut self, name: &str, args: Vec<Value>) -> Result<Value, OmniError> {
        if self.registry.has(name) {
            return self
                .registry
                .call(name, &args)
                .map_err(|e| e.with_line(self.current_line));
        }
        if let Some(func) = self.functions.get(name).cloned() {
            return self.call_function(&func, args);
        }
        Err(OmniError::unknown_function(name, self.current_line))
    }

    fn eval_method_call(
        &mut self,
        object: &Expr,
        method: &str,
        args: &[Expr],
    ) -> Result<Value, OmniError> {
        // A bare identifier whose dotted name is registered is a static
        // built-in call; the receiver is never evaluated.
        if let ExprKind::Variable(prefix) = &object.kind {
            let qualified = format!("{}.{}", prefix, method);
            if self.registry.has(&qualified) {
                let evaluated = self.eval_args(args)?;
                return self
                    .registry
                    .call(&qualified, &evaluated)
                    .map_err(|e| e.with_line(self.current_line));
            }
        }

        let receiver = self.eval_expr(object)?;
        let evaluated = self.eval_args(args)?;

        match &receiver {
            Value::String(s) => {
                // String methods route through the registry with the
                // receiver prepended.
                let qualified = format!("String.{}", method);
                if self.registry.has(&qualified) {
                    let mut all = Vec::with_capacity(evaluated.len() + 1);
                    all.push(receiver.clone());
                    all.extend(evaluated);
                    return self
                        .registry
                        .call(&qualified, &all)
                        .map_err(|e| e.with_line(self.current_line));
                }
                if method == "length" {
                    return Ok(Value::Int(s.len() as i64));
                }
                Ok(Value::Null)
            }

            Value::Object(_) => {
                // Dispatch through the object's class tag; bare maps have
                // no tag and yield Null.
                if let Some(class_name) = receiver.class_name().map(str::to_string) {
                    if let Some(class) = self.classes.get(&class_name).cloned() {
                        if let Some(m) = class.methods.iter().find(|m| m.name == method) {
                            self.env.push_scope();
                            self.env.define("self", receiver.clone());
                            let result = self.call_function(m, evaluated);
                            self.env.pop_scope();
                            return result;
                        }
                    }
                }
                Ok(Value::Null)
            }

            _ => Ok(Value::Null),
        }
    }

    /// Builds an object: tags it with its class, initializes declared
    /// fields in order, then runs `__init__` with `self` bound. Mutations
    /// the constructor makes to `self` are preserved in the result.
    fn create_object(&mut self, class_name: &str, arg_exprs: &[Expr]) -> Result<Value, OmniError> {
        let mut map = IndexMap::new();
        map.insert(CLASS_KEY.to_string(), Value::string(class_name));

        let Some(class) = self.classes.get(class_name).cloned() else {
            return Ok(Value::Object(map));
        };

        for field in &class.fields {
            let value = match &field.initializer {
                Some(expr) => self.eval_expr(expr)?,
                None => Value::Null,
            };
            map.insert(field.name.clone(), value);
        }

        let mut object = Value::Object(map);

        if let Some(ctor) = &class.constructor {
            let args = self.eval_args(arg_exprs)?;

            self.env.push_scope();
            self.env.define("self", object);
            let mut arg_index = 0;
            for param in &ctor.args {
                if param.name == "self" {
                    continue;
                }
                if let Some(value) = args.get(arg_index) {
                    self.env.define(&param.name, value.clone());
                    arg_index += 1;
                }
            }

            let flow = self.run_constructor_body(&ctor.body);
            object = self.env.get_var("self");
            self.env.pop_scope();
            flow?;
        }

        Ok(object)
    }

    fn run_constructor_body(&mut self, body: &[Stmt]) -> Result<(), OmniError> {
        for stmt in body {
            match self.exec_stmt(stmt)? {
                Exec::Normal(_) => {}
                Exec::Return(_) => return Ok(()),
                Exec::Break | Exec::Continue => {
                    return Err(OmniError::new(
                        "break or continue outside of loop",
                        self.current_line,
                    ));
                }
            }
        }
        Ok(())
    }

    //===------------------------------------------------------------===//
    // Assignment targets
    //===------------------------------------------------------------===//

    /// Assigns through a member/index chain. The base variable's value is
    /// cloned, the path walked, the leaf written, and the base rebound,
    /// keeping pass-by-value semantics.
    fn assign_target(&mut self, target: &Expr, value: Value) -> Result<(), OmniError> {
        let mut segments = Vec::new();
        let mut cursor = target;
        let base_name = loop {
            match &cursor.kind {
                ExprKind::MemberAccess { object, member } => {
                    segments.push(PathSegment::Member(member.clone()));
                    cursor = object;
                }
                ExprKind::Index { container, index } => {
                    let idx = self.eval_expr(index)?.as_int();
                    segments.push(PathSegment::Index(idx));
                    cursor = container;
                }
                ExprKind::Variable(name) => break name.clone(),
                ExprKind::SelfRef => break "self".to_string(),
                _ => {
                    return Err(OmniError::new(
                        "Invalid assignment target",
                        self.current_line,
                    ));
                }
            }
        };
        segments.reverse();

        let mut base = self.env.get_var(&base_name);
        write_path(&mut base, &segments, value);
        self.env.set_var(&base_name, base);
        Ok(())
    }

    //===------------------------------------------------------------===//
    // F-strings
    //===------------------------------------------------------------===//

    /// Replaces every `{name}` in the template with the rendered value of
    /// the in-scope variable; unmatched braces pass through literally.
    fn interpolate(&self, template: &str) -> String {
        let chars: Vec<char> = template.chars().collect();
        let mut result = String::new();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '{' {
                if let Some(close) = chars[i + 1..].iter().position(|c| *c == '}') {
                    let name: String = chars[i + 1..i + 1 + close].iter().collect();
                    result.push_str(&self.env.get_var(&name).render());
                    i += close + 2;
                    continue;
                }
            }
            result.push(chars[i]);
            i += 1;
        }
        result
    }
}

/// Indexing applies to arrays and strings (yielding a one-character
/// string); out-of-range access and other receivers give Null.
fn index_value(container: &Value, index: i64) -> Value {
    match container {
        Value::Array(items) => usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i).cloned())
            .unwrap_or(Value::Null),
        Value::String(s) => usize::try_from(index)
            .ok()
            .and_then(|i| s.as_bytes().get(i).copied())
            .map(|b| Value::string((b as char).to_string()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn write_path(slot: &mut Value, path: &[PathSegment], value: Value) {
    match path.split_first() {
        None => *slot = value,
        Some((PathSegment::Member(name), rest)) => {
            if let Value::Object(map) = slot {
                let entry = map.entry(name.clone()).or_insert(Value::Null);
                write_path(entry, rest, value);
            }
        }
        Some((PathSegment::Index(index), rest)) => {
            if let Value::Array(items) = slot {
                if let Some(entry) = usize::try_from(*index)
                    .ok()
                    .and_then(|i| items.get_mut(i))
                {
                    write_path(entry, rest, value);
                }
            }
        }
    }
}

/// Binary operators over already-evaluated operands. `+` concatenates
/// when either side is a string; arithmetic between two Ints stays Int,
/// otherwise runs on doubles. Division by zero yields 0.0 rather than
/// raising; the same rule gives modulo by zero 0.
fn eval_binary_op(op: &str, left: &Value, right: &Value) -> Value {
    if op == "+" && (matches!(left, Value::String(_)) || matches!(right, Value::String(_))) {
        return Value::string(format!("{}{}", left.render(), right.render()));
    }

    fn arithmetic(
        left: &Value,
        right: &Value,
        ints: fn(i64, i64) -> Option<i64>,
        doubles: fn(f64, f64) -> f64,
    ) -> Value {
        if let (Value::Int(a), Value::Int(b)) = (left, right) {
            if let Some(result) = ints(*a, *b) {
                return Value::Int(result);
            }
        }
        Value::Double(doubles(left.as_double(), right.as_double()))
    }

    match op {
        "+" => arithmetic(left, right, i64::checked_add, |a, b| a + b),
        "-" => arithmetic(left, right, i64::checked_sub, |a, b| a - b),
        "*" => arithmetic(left, right, i64::checked_mul, |a, b| a * b),
        "/" => {
            let denominator = right.as_double();
            if denominator == 0.0 {
                Value::Double(0.0)
            } else {
                Value::Double(left.as_double() / denominator)
            }
        }
        "%" => Value::Int(left.as_int().checked_rem(right.as_int()).unwrap_or(0)),
        "==" => {
            if let (Value::String(a), Value::String(b)) = (left, right) {
                Value::Bool(a == b)
            } else {
                Value::Bool(left.as_double() == right.as_double())
            }
        }
        // Unlike `==`, inequality has no string case.
        "!=" => Value::Bool(left.as_double() != right.as_double()),
        "<" => Value::Bool(left.as_double() < right.as_double()),
        ">" => Value::Bool(left.as_double() > right.as_double()),
        "<=" => Value::Bool(left.as_double() <= right.as_double()),
        ">=" => Value::Bool(left.as_double() >= right.as_double()),
        "&&" => Value::Bool(left.truthy() && right.truthy()),
        "||" => Value::Bool(left.truthy() || right.truthy()),
        _ => Value::Null,
    }
}

/// Lexes and parses source text, pooling lexer and parser diagnostics.
pub fn parse_program(source: &str) -> (Program, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    let mut diagnostics = lexer.into_diagnostics();
    let (program, parse_errors) = Parser::new(tokens).parse();
    diagnostics.extend(parse_errors);
    (program, diagnostics)
}

/// Convenience entry point: parse the source and run its `main` with the
/// standard built-in registry.
pub fn run_source(source: &str) -> Result<Value, OmniError> {
    let (program, _diagnostics) = parse_program(source);
    Interpreter::new().execute(&program)
}
