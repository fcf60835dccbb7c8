//! Recursive-descent parser with a Pratt precedence climb for expressions.
//!
//! The parser keeps going after an error: the failure is recorded as a
//! diagnostic, `synchronize` skips ahead to a statement-starting token,
//! and parsing resumes, so several errors can surface from a single run.

use crate::ast::{
    AccessModifier, ClassDecl, Expr, ExprKind, FieldDecl, FuncArg, Function, ImportDecl,
    InterfaceDecl, Program, Stmt, StmtKind, TypeInfo,
};
use crate::diagnostic::Diagnostic;
use crate::token::{Token, TokenKind};

/// Marker for an already-recorded parse failure; the caller unwinds to a
/// recovery point.
pub struct ParseAbort;

type PResult<T> = Result<T, ParseAbort>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<Diagnostic>,
}

fn precedence(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Or => 5,
        TokenKind::And => 6,
        TokenKind::Equal | TokenKind::NotEqual => 10,
        TokenKind::Less | TokenKind::Greater | TokenKind::LessEqual | TokenKind::GreaterEqual => 15,
        TokenKind::Plus | TokenKind::Minus => 20,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 30,
        // Member access and indexing bind tightest.
        TokenKind::Dot | TokenKind::LBracket => 40,
        _ => 0,
    }
}

fn starts_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number
            | TokenKind::Str
            | TokenKind::FStr
            | TokenKind::Identifier
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::New
            | TokenKind::SelfKw
            | TokenKind::This
            | TokenKind::Not
            | TokenKind::Minus
            // Type keywords double as identifiers so `String.length(s)`
            // and `int(x)` parse.
            | TokenKind::StringType
            | TokenKind::Int
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Bool
            | TokenKind::Char
            | TokenKind::Void
    )
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::new(TokenKind::Eof, "", line, 1));
        }
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parses the whole token stream, returning the program alongside any
    /// diagnostics collected during recovery.
    pub fn parse(mut self) -> (Program, Vec<Diagnostic>) {
        let mut program = Program::default();

        while !self.is_at_end() {
            while self.match_kind(TokenKind::Newline) {}
            if self.is_at_end() {
                break;
            }

            let outcome = self.parse_top_level(&mut program);
            if outcome.is_err() {
                self.synchronize();
            }
        }

        (program, self.errors)
    }

    fn parse_top_level(&mut self, program: &mut Program) -> PResult<()> {
        match self.peek().kind {
            TokenKind::Import => {
                let import = self.parse_import()?;
                program.imports.push(import);
            }
            TokenKind::Class => {
                let class = self.parse_class()?;
                program.classes.push(class);
            }
            TokenKind::Interface => {
                let interface = self.parse_interface()?;
                program.interfaces.push(interface);
            }
            TokenKind::Def => {
                let function = self.parse_function()?;
                program.functions.push(function);
            }
            TokenKind::Public | TokenKind::Private | TokenKind::Protected => {
                self.parse_access_modifier();
                match self.peek().kind {
                    TokenKind::Class => {
                        let class = self.parse_class()?;
                        program.classes.push(class);
                    }
                    TokenKind::Def => {
                        let function = self.parse_function()?;
                        program.functions.push(function);
                    }
                    _ => {
                        let tok = self.peek().clone();
                        self.errors.push(Diagnostic::parse_error(
                            format!("Unexpected token '{}' after access modifier", tok.text),
                            tok.line,
                        ));
                        self.advance();
                    }
                }
            }
            kind if kind.is_type_name()
                && self.peek_ahead(1) == TokenKind::Identifier
                && self.peek_ahead(2) == TokenKind::LParen =>
            {
                // C-style declaration: int main(...)
                let function = self.parse_function()?;
                program.functions.push(function);
            }
            _ => {
                let tok = self.peek().clone();
                self.errors.push(Diagnostic::parse_error(
                    format!("Unexpected token '{}' at top level", tok.text),
                    tok.line,
                ));
                self.advance();
            }
        }
        Ok(())
    }

    fn parse_import(&mut self) -> PResult<ImportDecl> {
        self.expect(TokenKind::Import, "Expected 'import'")?;
        // Accepts a bare identifier or a quoted path.
        let name = self.advance();
        Ok(ImportDecl { module: name.text })
    }

    //===------------------------------------------------------------===//
    // Declarations
    //===------------------------------------------------------------===//

    fn parse_class(&mut self) -> PResult<ClassDecl> {
        self.expect(TokenKind::Class, "Expected 'class'")?;
        let name = self.advance().text;

        // Inheritance: class Dog(Animal) or class Dog extends Animal
        let mut parent = None;
        if self.match_kind(TokenKind::LParen) {
            parent = Some(self.advance().text);
            self.expect(TokenKind::RParen, "Expected ')' after parent class")?;
        } else if self.match_kind(TokenKind::Extends) {
            parent = Some(self.advance().text);
        }

        let mut interfaces = Vec::new();
        if self.match_kind(TokenKind::Implements) {
            loop {
                interfaces.push(self.advance().text);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::Colon, "Expected ':' before class body")?;
        while self.match_kind(TokenKind::Newline) {}
        self.expect(TokenKind::Indent, "Expected indent for class body")?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut constructor = None;

        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            while self.match_kind(TokenKind::Newline) {}
            if self.check(TokenKind::Dedent) {
                break;
            }

            let access = self.parse_access_modifier();
            let is_static = self.match_kind(TokenKind::Static);

            if self.check(TokenKind::Def) {
                let mut method = self.parse_function()?;
                method.access = access;
                method.is_static = is_static;
                if method.name == "__init__" {
                    constructor = Some(method);
                } else {
                    methods.push(method);
                }
            } else if self.peek().kind.is_type_name() {
                // Field: String name or public int age = 0
                let ty = self.parse_type()?;
                let field_name = self.advance().text;
                let initializer = if self.match_kind(TokenKind::Assign) {
                    self.parse_expression()?
                } else {
                    None
                };
                fields.push(FieldDecl {
                    access,
                    ty,
                    name: field_name,
                    initializer,
                });
            } else {
                let tok = self.peek().clone();
                self.errors.push(Diagnostic::parse_error(
                    format!("Unexpected token '{}' in class body", tok.text),
                    tok.line,
                ));
                return Err(ParseAbort);
            }
        }

        self.match_kind(TokenKind::Dedent);

        Ok(ClassDecl {
            name,
            parent,
            interfaces,
            fields,
            methods,
            constructor,
        })
    }

    fn parse_interface(&mut self) -> PResult<InterfaceDecl> {
        self.expect(TokenKind::Interface, "Expected 'interface'")?;
        let name = self.advance().text;

        self.expect(TokenKind::Colon, "Expected ':' before interface body")?;
        while self.match_kind(TokenKind::Newline) {}
        self.expect(TokenKind::Indent, "Expected indent for interface body")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            while self.match_kind(TokenKind::Newline) {}
            if self.check(TokenKind::Dedent) {
                break;
            }
            if self.check(TokenKind::Def) {
                methods.push(self.parse_function()?);
            } else {
                let tok = self.peek().clone();
                self.errors.push(Diagnostic::parse_error(
                    format!("Unexpected token '{}' in interface body", tok.text),
                    tok.line,
                ));
                return Err(ParseAbort);
            }
        }

        self.match_kind(TokenKind::Dedent);

        Ok(InterfaceDecl { name, methods })
    }

    /// Parses both declaration styles: `def name(a: T, b) -> R:` and the
    /// C-flavored `R name(T a):`. A leading `self`/`this` parameter is
    /// normalized to the name `self`.
    fn parse_function(&mut self) -> PResult<Function> {
        let mut return_type = TypeInfo::default();
        let name;

        if self.match_kind(TokenKind::Def) {
            name = self.advance().text;
        } else if self.peek().kind.is_type_name() {
            return_type = self.parse_type()?;
            name = self.advance().text;
        } else {
            let tok = self.peek().clone();
            self.errors.push(Diagnostic::parse_error(
                "Expected function declaration",
                tok.line,
            ));
            return Err(ParseAbort);
        }

        self.expect(TokenKind::LParen, "Expected '(' after function name")?;

        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            if self.check(TokenKind::SelfKw) || self.check(TokenKind::This) {
                self.advance();
                args.push(FuncArg {
                    name: "self".to_string(),
                    ty: TypeInfo::named("self"),
                });
                if !self.check(TokenKind::RParen) {
                    self.match_kind(TokenKind::Comma);
                }
                continue;
            }

            // "name: type", "type name", or bare "name"
            let first = self.advance();
            let arg = if self.match_kind(TokenKind::Colon) {
                let ty = self.parse_type()?;
                FuncArg {
                    name: first.text,
                    ty,
                }
            } else if self.check(TokenKind::Identifier) {
                let arg_name = self.advance().text;
                FuncArg {
                    name: arg_name,
                    ty: TypeInfo::named(first.text),
                }
            } else {
                FuncArg {
                    name: first.text,
                    ty: TypeInfo::named("auto"),
                }
            };
            args.push(arg);

            if !self.check(TokenKind::RParen) && !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "Expected ')' after arguments")?;

        // def-style return type defaults to void unless an arrow follows.
        if return_type.name.is_empty() {
            return_type = TypeInfo::named("void");
            if self.match_kind(TokenKind::Arrow) {
                return_type = self.parse_type()?;
            }
        }

        self.expect(TokenKind::Colon, "Expected ':' before function body")?;
        let body = self.parse_block()?;

        Ok(Function {
            access: AccessModifier::Public,
            is_static: false,
            name,
            args,
            return_type,
            body,
        })
    }

    fn parse_type(&mut self) -> PResult<TypeInfo> {
        let tok = self.advance();
        let mut info = TypeInfo::named(tok.text);

        if self.match_kind(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket, "Expected ']' for array type")?;
            info.is_array = true;
        }

        if self.match_kind(TokenKind::Less) {
            let param = self.advance();
            info.generic_param = Some(param.text);
            self.expect(TokenKind::Greater, "Expected '>' for generic type")?;
        }

        Ok(info)
    }

    fn parse_access_modifier(&mut self) -> AccessModifier {
        if self.match_kind(TokenKind::Public) {
            AccessModifier::Public
        } else if self.match_kind(TokenKind::Private) {
            AccessModifier::Private
        } else if self.match_kind(TokenKind::Protected) {
            AccessModifier::Protected
        } else {
            AccessModifier::Public
        }
    }

    //===------------------------------------------------------------===//
    // Blocks & statements
    //===------------------------------------------------------------===//

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while self.match_kind(TokenKind::Newline) {}
        self.expect(TokenKind::Indent, "Expected indented block")?;

        while !self.check(TokenKind::Dedent) && !self.is_at_end() {
            if self.match_kind(TokenKind::Newline) {
                continue;
            }
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
        }

        self.match_kind(TokenKind::Dedent);
        Ok(statements)
    }

    fn parse_statement(&mut self) -> PResult<Option<Stmt>> {
        while self.match_kind(TokenKind::Newline) {}

        if self.check(TokenKind::Dedent) || self.is_at_end() {
            return Ok(None);
        }

        let stmt = match self.peek().kind {
            TokenKind::Return => self.parse_return()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Try => self.parse_try_catch()?,
            TokenKind::Throw => self.parse_throw()?,
            TokenKind::Break => {
                let line = self.advance().line;
                Stmt::new(StmtKind::Break, line)
            }
            TokenKind::Continue => {
                let line = self.advance().line;
                Stmt::new(StmtKind::Continue, line)
            }
            _ => self.parse_expression_statement()?,
        };
        Ok(Some(stmt))
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let line = self.advance().line;
        let value = self.parse_expression()?;
        Ok(Stmt::new(StmtKind::Return(value), line))
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let line = self.advance().line;
        let condition = self.require_expression("Expected condition after 'if'")?;
        self.expect(TokenKind::Colon, "Expected ':' after if condition")?;

        let then_body = self.parse_block()?;
        let else_body = self.parse_elif_else_chain()?;

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_body,
                else_body,
            },
            line,
        ))
    }

    /// Each `elif` becomes a nested `If` as the sole statement of the
    /// preceding else body; a final `else` terminates the chain.
    fn parse_elif_else_chain(&mut self) -> PResult<Vec<Stmt>> {
        let mut else_body = Vec::new();

        while self.match_kind(TokenKind::Newline) {}

        if self.check(TokenKind::Elif) {
            let line = self.advance().line;
            let condition = self.require_expression("Expected condition after 'elif'")?;
            self.expect(TokenKind::Colon, "Expected ':' after elif condition")?;

            let then_body = self.parse_block()?;
            let nested_else = self.parse_elif_else_chain()?;

            else_body.push(Stmt::new(
                StmtKind::If {
                    condition,
                    then_body,
                    else_body: nested_else,
                },
                line,
            ));
        } else if self.check(TokenKind::Else) {
            self.advance();
            self.expect(TokenKind::Colon, "Expected ':' after else")?;
            else_body = self.parse_block()?;
        }

        Ok(else_body)
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let line = self.advance().line;
        let condition = self.require_expression("Expected condition after 'while'")?;
        self.expect(TokenKind::Colon, "Expected ':' after while condition")?;

        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::While { condition, body }, line))
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        let line = self.advance().line;
        let var = self.advance().text;
        self.expect(TokenKind::In, "Expected 'in' after loop variable")?;

        let iterable = self.require_expression("Expected iterable expression")?;
        self.expect(TokenKind::Colon, "Expected ':' after for")?;

        let body = self.parse_block()?;
        Ok(Stmt::new(
            StmtKind::For {
                var,
                iterable,
                body,
            },
            line,
        ))
    }

    fn parse_try_catch(&mut self) -> PResult<Stmt> {
        let line = self.advance().line;
        self.expect(TokenKind::Colon, "Expected ':' after try")?;
        let try_body = self.parse_block()?;

        while self.match_kind(TokenKind::Newline) {}
        self.expect(TokenKind::Catch, "Expected 'catch' after try block")?;

        // catch Exception as e:
        let mut exception_type = "Exception".to_string();
        let mut exception_var = "e".to_string();
        if self.check(TokenKind::Identifier) {
            exception_type = self.advance().text;
        }
        if self.match_kind(TokenKind::As) {
            exception_var = self.advance().text;
        }

        self.expect(TokenKind::Colon, "Expected ':' after catch")?;
        let catch_body = self.parse_block()?;

        let mut finally_body = Vec::new();
        while self.match_kind(TokenKind::Newline) {}
        if self.match_kind(TokenKind::Finally) {
            self.expect(TokenKind::Colon, "Expected ':' after finally")?;
            finally_body = self.parse_block()?;
        }

        Ok(Stmt::new(
            StmtKind::TryCatch {
                try_body,
                exception_var,
                exception_type,
                catch_body,
                finally_body,
            },
            line,
        ))
    }

    fn parse_throw(&mut self) -> PResult<Stmt> {
        let line = self.advance().line;
        let exception = self.require_expression("Expected expression after 'throw'")?;
        Ok(Stmt::new(StmtKind::Throw(exception), line))
    }

    fn parse_expression_statement(&mut self) -> PResult<Stmt> {
        let expr = self.require_expression("Expected expression")?;
        let line = expr.line;

        // Rewrite `target = expr` statements. Bare names become variable
        // declarations with an inferred type; member and index targets
        // become assignments.
        if self.match_kind(TokenKind::Assign) {
            let value = self.require_expression("Expected expression after '='")?;
            if let ExprKind::Variable(name) = &expr.kind {
                return Ok(Stmt::new(
                    StmtKind::VarDecl {
                        name: name.clone(),
                        ty: TypeInfo::default(),
                        init: Some(value),
                    },
                    line,
                ));
            }
            if matches!(
                expr.kind,
                ExprKind::MemberAccess { .. } | ExprKind::Index { .. }
            ) {
                return Ok(Stmt::new(
                    StmtKind::Assign {
                        target: expr,
                        value,
                    },
                    line,
                ));
            }
            self.errors
                .push(Diagnostic::parse_error("Invalid assignment target", line));
            return Err(ParseAbort);
        }

        Ok(Stmt::new(StmtKind::Expr(expr), line))
    }

    //===------------------------------------------------------------===//
    // Expressions
    //===------------------------------------------------------------===//

    fn parse_expression(&mut self) -> PResult<Option<Expr>> {
        if !starts_expression(self.peek().kind) {
            return Ok(None);
        }
        let lhs = match self.parse_primary()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        Ok(Some(self.parse_binary_rhs(1, lhs)?))
    }

    fn require_expression(&mut self, message: &str) -> PResult<Expr> {
        match self.parse_expression()? {
            Some(expr) => Ok(expr),
            None => {
                let tok = self.peek().clone();
                self.errors.push(Diagnostic::parse_error(
                    format!("{}, found '{}'", message, tok.text),
                    tok.line,
                ));
                Err(ParseAbort)
            }
        }
    }

    fn parse_binary_rhs(&mut self, min_prec: u8, mut lhs: Expr) -> PResult<Expr> {
        loop {
            let tok_prec = precedence(self.peek().kind);
            if tok_prec < min_prec {
                return Ok(lhs);
            }

            let op_token = self.advance();

            // `.` becomes a method call when a '(' follows the member name.
            if op_token.kind == TokenKind::Dot {
                let member = self.advance();
                if self.check(TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_call_args()?;
                    self.expect(TokenKind::RParen, "Expected ')' after method arguments")?;
                    lhs = Expr::new(
                        ExprKind::MethodCall {
                            object: Box::new(lhs),
                            method: member.text,
                            args,
                        },
                        member.line,
                    );
                } else {
                    lhs = Expr::new(
                        ExprKind::MemberAccess {
                            object: Box::new(lhs),
                            member: member.text,
                        },
                        member.line,
                    );
                }
                continue;
            }

            if op_token.kind == TokenKind::LBracket {
                let index = self.require_expression("Expected index expression")?;
                self.expect(TokenKind::RBracket, "Expected ']'")?;
                lhs = Expr::new(
                    ExprKind::Index {
                        container: Box::new(lhs),
                        index: Box::new(index),
                    },
                    op_token.line,
                );
                continue;
            }

            let rhs = match self.parse_primary()? {
                Some(expr) => expr,
                None => return Ok(lhs),
            };

            let next_prec = precedence(self.peek().kind);
            let rhs = if tok_prec < next_prec {
                self.parse_binary_rhs(tok_prec + 1, rhs)?
            } else {
                rhs
            };

            lhs = Expr::new(
                ExprKind::Binary {
                    op: op_token.text,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                op_token.line,
            );
        }
    }

    fn parse_primary(&mut self) -> PResult<Option<Expr>> {
        let tok = self.peek().clone();

        match tok.kind {
            TokenKind::Newline
            | TokenKind::Dedent
            | TokenKind::Indent
            | TokenKind::Colon
            | TokenKind::Assign
            | TokenKind::Eof => Ok(None),

            TokenKind::Not | TokenKind::Minus => {
                self.advance();
                match self.parse_primary()? {
                    Some(operand) => Ok(Some(Expr::new(
                        ExprKind::Unary {
                            op: tok.text,
                            operand: Box::new(operand),
                        },
                        tok.line,
                    ))),
                    None => {
                        self.errors.push(Diagnostic::parse_error(
                            format!("Expected operand after '{}'", tok.text),
                            tok.line,
                        ));
                        Err(ParseAbort)
                    }
                }
            }

            TokenKind::New => Ok(Some(self.parse_new()?)),

            TokenKind::SelfKw | TokenKind::This => {
                self.advance();
                Ok(Some(Expr::new(ExprKind::SelfRef, tok.line)))
            }

            TokenKind::Number => {
                self.advance();
                let numeric = tok.text.trim_end_matches(['f', 'F']);
                let value = numeric.parse().unwrap_or(0.0);
                Ok(Some(Expr::new(ExprKind::Number(value), tok.line)))
            }

            TokenKind::Str => {
                self.advance();
                Ok(Some(Expr::new(ExprKind::Str(tok.text), tok.line)))
            }

            TokenKind::FStr => {
                self.advance();
                Ok(Some(Expr::new(ExprKind::FStr(tok.text), tok.line)))
            }

            TokenKind::Identifier => {
                self.advance();

                // Single-parameter lambda: x -> expr
                if self.check(TokenKind::Arrow) {
                    self.advance();
                    let body = self.require_expression("Expected lambda body after '->'")?;
                    return Ok(Some(Expr::new(
                        ExprKind::Lambda {
                            params: vec![tok.text],
                            body: Box::new(body),
                        },
                        tok.line,
                    )));
                }

                if self.check(TokenKind::LParen) {
                    return Ok(Some(self.parse_call(tok.text, tok.line)?));
                }
                Ok(Some(Expr::new(ExprKind::Variable(tok.text), tok.line)))
            }

            // Type keywords act as bare identifiers so static calls like
            // String.length(s) and conversions like int(x) parse.
            TokenKind::StringType
            | TokenKind::Int
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Bool
            | TokenKind::Char
            | TokenKind::Void => {
                self.advance();
                if self.check(TokenKind::LParen) {
                    return Ok(Some(self.parse_call(tok.text, tok.line)?));
                }
                Ok(Some(Expr::new(ExprKind::Variable(tok.text), tok.line)))
            }

            TokenKind::LParen => {
                self.advance();
                let expr = self.require_expression("Expected expression after '('")?;
                self.expect(TokenKind::RParen, "Expected ')' after expression")?;
                Ok(Some(expr))
            }

            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(TokenKind::RBracket) && !self.is_at_end() {
                    match self.parse_expression()? {
                        Some(element) => elements.push(element),
                        None => break,
                    }
                    if !self.check(TokenKind::RBracket) && !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket, "Expected ']'")?;
                Ok(Some(Expr::new(ExprKind::Array(elements), tok.line)))
            }

            _ => Ok(None),
        }
    }

    fn parse_new(&mut self) -> PResult<Expr> {
        let line = self.advance().line;
        let class_name = self.advance().text;

        self.expect(TokenKind::LParen, "Expected '(' after class name")?;
        let args = self.parse_call_args()?;
        self.expect(TokenKind::RParen, "Expected ')' after constructor arguments")?;

        Ok(Expr::new(ExprKind::New { class_name, args }, line))
    }

    fn parse_call(&mut self, callee: String, line: usize) -> PResult<Expr> {
        self.expect(TokenKind::LParen, "Expected '(' for function call")?;
        let args = self.parse_call_args()?;
        self.expect(TokenKind::RParen, "Expected ')' after arguments")?;
        Ok(Expr::new(ExprKind::Call { callee, args }, line))
    }

    /// Comma-separated arguments up to (not including) the closing ')'.
    fn parse_call_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            match self.parse_expression()? {
                Some(arg) => args.push(arg),
                None => break,
            }
            if !self.check(TokenKind::RParen) && !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    //===------------------------------------------------------------===//
    // Utilities
    //===------------------------------------------------------------===//

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_ahead(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.current + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> PResult<()> {
        if self.match_kind(kind) {
            Ok(())
        } else {
            let line = self.peek().line;
            self.errors
                .push(Diagnostic::parse_error(message, line));
            Err(ParseAbort)
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Skips ahead to the next statement-starting token after an error.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            match self.peek().kind {
                TokenKind::Newline | TokenKind::Def | TokenKind::Class | TokenKind::If => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
