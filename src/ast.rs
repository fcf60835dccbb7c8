//! Syntax tree produced by the parser.
//!
//! Expressions and statements are kind enums wrapped in a struct carrying
//! the originating source line for diagnostics. Type annotations are parsed
//! into [`TypeInfo`] but treated as opaque by the evaluator.

/// A parsed type annotation: `int`, `String[]`, `List<int>`, ...
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeInfo {
    pub name: String,
    pub is_array: bool,
    pub generic_param: Option<String>,
}

impl TypeInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

impl Expr {
    pub fn new(kind: ExprKind, line: usize) -> Self {
        Self { kind, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal kept as a double; the evaluator narrows to Int when
    /// the value is exactly representable.
    Number(f64),
    Str(String),
    /// Raw f-string template; `{name}` placeholders resolve at evaluation.
    FStr(String),
    Variable(String),
    SelfRef,
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    /// Bare-identifier call: `print(x)`, `range(5)`.
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    /// `obj.method(args)`; also carries qualified built-in calls such as
    /// `Math.sqrt(x)` when `obj` is a bare identifier.
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    MemberAccess {
        object: Box<Expr>,
        member: String,
    },
    New {
        class_name: String,
        args: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Index {
        container: Box<Expr>,
        index: Box<Expr>,
    },
    /// Single-expression lambda: `x -> x * 2`.
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize) -> Self {
        Self { kind, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    VarDecl {
        name: String,
        ty: TypeInfo,
        init: Option<Expr>,
    },
    /// Assignment to a member or index target: `self.x = v`, `a[i] = v`.
    Assign {
        target: Expr,
        value: Expr,
    },
    Return(Option<Expr>),
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    TryCatch {
        try_body: Vec<Stmt>,
        exception_var: String,
        exception_type: String,
        catch_body: Vec<Stmt>,
        finally_body: Vec<Stmt>,
    },
    Throw(Expr),
    Break,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessModifier {
    #[default]
    Public,
    Private,
    Protected,
}

/// A declared function parameter. A leading `self`/`this` is normalized to
/// the name `self` with type `self` and marks the function as a method.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncArg {
    pub name: String,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub access: AccessModifier,
    pub ty: TypeInfo,
    pub name: String,
    pub initializer: Option<Expr>,
}

/// A function or method definition. Access and staticness are recorded but
/// not enforced at evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub access: AccessModifier,
    pub is_static: bool,
    pub name: String,
    pub args: Vec<FuncArg>,
    pub return_type: TypeInfo,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<Function>,
    /// The `__init__` method, when declared.
    pub constructor: Option<Function>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub methods: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub module: String,
}

/// Root of a parsed source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub imports: Vec<ImportDecl>,
    pub classes: Vec<ClassDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    pub functions: Vec<Function>,
}
