//! Lexical analyzer for OmniLang source text.
//!
//! Converts source code into a token stream, deriving synthetic INDENT,
//! DEDENT and NEWLINE tokens from physical whitespace the way Python does.
//! Tokenization is total: unexpected characters are recorded as diagnostics
//! and skipped, never aborting the scan.

use crate::diagnostic::Diagnostic;
use crate::token::{keyword_kind, Token, TokenKind};

pub struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    indent_stack: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            src: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            indent_stack: vec![0],
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics collected during the last `tokenize` call.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while self.pos < self.src.len() {
            let current = self.peek(0);

            // Newlines drive the indentation protocol.
            if current == '\n' {
                self.advance();
                tokens.push(Token::new(TokenKind::Newline, "\\n", self.line, self.col));
                self.line += 1;
                self.col = 1;
                self.handle_indentation(&mut tokens);
                continue;
            }

            if current.is_whitespace() {
                self.advance();
                continue;
            }

            if current == '#' {
                self.skip_line_comment();
                continue;
            }
            if current == '/' && self.peek(1) == '/' {
                self.skip_line_comment();
                continue;
            }

            if current.is_ascii_alphabetic() || current == '_' {
                // f-string: an `f` glued to a quote
                if current == 'f' && (self.peek(1) == '"' || self.peek(1) == '\'') {
                    tokens.push(self.fstring());
                    continue;
                }
                tokens.push(self.identifier());
                continue;
            }

            if current.is_ascii_digit() {
                tokens.push(self.number());
                continue;
            }

            if current == '"' || current == '\'' {
                tokens.push(self.string(current));
                continue;
            }

            if let Some(token) = self.operator(current) {
                tokens.push(token);
            }
        }

        // Close any blocks still open at end of file.
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            tokens.push(Token::new(TokenKind::Dedent, "DEDENT", self.line, self.col));
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
        tokens
    }

    /// Measures the leading whitespace of the line starting at `pos` and
    /// emits INDENT/DEDENT tokens against the indent stack. Blank and
    /// comment-only lines leave the stack untouched.
    fn handle_indentation(&mut self, tokens: &mut Vec<Token>) {
        let mut spaces = 0usize;
        while self.peek(0) == ' ' || self.peek(0) == '\t' {
            // Tab counts as 4 spaces.
            spaces += if self.peek(0) == '\t' { 4 } else { 1 };
            self.advance();
        }

        if self.peek(0) == '\n' || self.peek(0) == '#' {
            return;
        }

        let current_indent = *self.indent_stack.last().unwrap_or(&0);

        if spaces > current_indent {
            self.indent_stack.push(spaces);
            tokens.push(Token::new(TokenKind::Indent, "INDENT", self.line, self.col));
        } else if spaces < current_indent {
            while spaces < *self.indent_stack.last().unwrap_or(&0) {
                self.indent_stack.pop();
                tokens.push(Token::new(TokenKind::Dedent, "DEDENT", self.line, self.col));
            }
        }
    }

    fn operator(&mut self, current: char) -> Option<Token> {
        let line = self.line;
        let col = self.col;
        let token = |kind, text: &str| Some(Token::new(kind, text, line, col));

        let result = match current {
            '+' => {
                if self.match_next('+') {
                    token(TokenKind::PlusPlus, "++")
                } else if self.match_next('=') {
                    token(TokenKind::PlusAssign, "+=")
                } else {
                    token(TokenKind::Plus, "+")
                }
            }
            '-' => {
                if self.match_next('>') {
                    token(TokenKind::Arrow, "->")
                } else if self.match_next('-') {
                    token(TokenKind::MinusMinus, "--")
                } else if self.match_next('=') {
                    token(TokenKind::MinusAssign, "-=")
                } else {
                    token(TokenKind::Minus, "-")
                }
            }
            '*' => token(TokenKind::Star, "*"),
            '/' => {
                if self.match_next('*') {
                    self.skip_block_comment();
                    return None;
                }
                token(TokenKind::Slash, "/")
            }
            '%' => token(TokenKind::Percent, "%"),
            '=' => {
                if self.match_next('=') {
                    token(TokenKind::Equal, "==")
                } else {
                    token(TokenKind::Assign, "=")
                }
            }
            '!' => {
                if self.match_next('=') {
                    token(TokenKind::NotEqual, "!=")
                } else {
                    token(TokenKind::Not, "!")
                }
            }
            '<' => {
                if self.match_next('=') {
                    token(TokenKind::LessEqual, "<=")
                } else {
                    token(TokenKind::Less, "<")
                }
            }
            '>' => {
                if self.match_next('=') {
                    token(TokenKind::GreaterEqual, ">=")
                } else {
                    token(TokenKind::Greater, ">")
                }
            }
            '&' => {
                if self.match_next('&') {
                    token(TokenKind::And, "&&")
                } else {
                    None
                }
            }
            '|' => {
                if self.match_next('|') {
                    token(TokenKind::Or, "||")
                } else {
                    None
                }
            }
            '.' => token(TokenKind::Dot, "."),
            ':' => token(TokenKind::Colon, ":"),
            ';' => token(TokenKind::Semicolon, ";"),
            ',' => token(TokenKind::Comma, ","),
            '(' => token(TokenKind::LParen, "("),
            ')' => token(TokenKind::RParen, ")"),
            '[' => token(TokenKind::LBracket, "["),
            ']' => token(TokenKind::RBracket, "]"),
            '{' => token(TokenKind::LBrace, "{"),
            '}' => token(TokenKind::RBrace, "}"),
            other => {
                self.diagnostics.push(Diagnostic::lex_error(
                    format!("unexpected character '{}'", other),
                    self.line,
                ));
                None
            }
        };
        self.advance();
        result
    }

    fn skip_line_comment(&mut self) {
        while self.peek(0) != '\n' && self.peek(0) != '\0' {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        // Entered with the position on the opener's '*'.
        self.advance();
        while self.peek(0) != '\0' {
            if self.peek(0) == '*' && self.peek(1) == '/' {
                self.advance();
                self.advance();
                return;
            }
            if self.peek(0) == '\n' {
                self.line += 1;
            }
            self.advance();
        }
    }

    fn peek(&self, offset: usize) -> char {
        self.src.get(self.pos + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.peek(0);
        if self.pos < self.src.len() {
            self.pos += 1;
            self.col += 1;
        }
        c
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek(1) == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();
        while self.peek(0).is_ascii_alphanumeric() || self.peek(0) == '_' {
            text.push(self.advance());
        }
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, line, col)
    }

    fn number(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();
        while self.peek(0).is_ascii_digit() {
            text.push(self.advance());
        }
        if self.peek(0) == '.' && self.peek(1).is_ascii_digit() {
            text.push(self.advance());
            while self.peek(0).is_ascii_digit() {
                text.push(self.advance());
            }
        }
        // Float suffix: 3.14f
        if self.peek(0) == 'f' || self.peek(0) == 'F' {
            text.push(self.advance());
        }
        Token::new(TokenKind::Number, text, line, col)
    }

    fn string(&mut self, quote: char) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance(); // opening quote
        let mut text = String::new();
        while self.peek(0) != quote && self.peek(0) != '\0' {
            if self.peek(0) == '\\' {
                self.advance();
                let escaped = self.advance();
                match escaped {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    '\\' => text.push('\\'),
                    other => text.push(other),
                }
            } else {
                text.push(self.advance());
            }
        }
        self.advance(); // closing quote
        Token::new(TokenKind::Str, text, line, col)
    }

    fn fstring(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        self.advance(); // 'f'
        let quote = self.peek(0);
        self.advance(); // opening quote
        let mut text = String::new();
        while self.peek(0) != quote && self.peek(0) != '\0' {
            if self.peek(0) == '\\' {
                self.advance();
                let escaped = self.advance();
                match escaped {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    '\\' => text.push('\\'),
                    '{' => text.push('{'),
                    '}' => text.push('}'),
                    other => text.push(other),
                }
            } else {
                text.push(self.advance());
            }
        }
        self.advance(); // closing quote
        Token::new(TokenKind::FStr, text, line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("def main class x"),
            vec![
                TokenKind::Def,
                TokenKind::Identifier,
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_literal_keywords_stay_identifiers() {
        for text in ["true", "false", "null"] {
            let tokens = lex(text);
            assert_eq!(tokens[0].kind, TokenKind::Identifier);
            assert_eq!(tokens[0].text, text);
        }
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 3.14 2.5f");
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].text, "3.14");
        assert_eq!(tokens[2].text, "2.5f");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = lex(r#""a\nb\tc\\d\"e""#);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text, "a\nb\tc\\d\"e");
    }

    #[test]
    fn test_single_quoted_string() {
        let tokens = lex("'hello'");
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text, "hello");
    }

    #[test]
    fn test_fstring() {
        let tokens = lex(r#"f"hi {name}!""#);
        assert_eq!(tokens[0].kind, TokenKind::FStr);
        assert_eq!(tokens[0].text, "hi {name}!");
    }

    #[test]
    fn test_multi_char_operators() {
        assert_eq!(
            kinds("== != <= >= && || ++ -- += -= ->"),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusAssign,
                TokenKind::MinusAssign,
                TokenKind::Arrow,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "x # trailing\n// whole line\n/* block\nspanning */ y";
        let tokens: Vec<_> = lex(source)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.text)
            .collect();
        assert_eq!(tokens, vec!["x", "y"]);
    }

    #[test]
    fn test_block_comment_tracks_lines() {
        let tokens = lex("/* a\nb\nc */ x");
        let ident = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Identifier)
            .unwrap();
        assert_eq!(ident.line, 3);
    }

    #[test]
    fn test_indent_dedent_emitted() {
        let source = "def f():\n    x = 1\n    y = 2\n";
        let kinds = kinds(source);
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Indent).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Dedent).count(), 1);
    }

    #[test]
    fn test_indents_balance_when_nested() {
        let source = "def f():\n    if x:\n        y = 1\n    z = 2\n";
        let kinds = kinds(source);
        let indents = kinds.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = kinds.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
    }

    #[test]
    fn test_dedents_emitted_at_eof_without_trailing_newline() {
        let source = "def f():\n    if x:\n        y = 1";
        let kinds = kinds(source);
        let indents = kinds.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = kinds.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, dedents);
    }

    #[test]
    fn test_blank_lines_do_not_dedent() {
        let source = "def f():\n    x = 1\n\n    y = 2\n";
        let kinds = kinds(source);
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Dedent).count(), 1);
    }

    #[test]
    fn test_comment_only_lines_do_not_dedent() {
        let source = "def f():\n    x = 1\n# note\n    y = 2\n";
        let kinds = kinds(source);
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Dedent).count(), 1);
    }

    #[test]
    fn test_tab_counts_as_four_spaces() {
        let source = "def f():\n\tx = 1\n    y = 2\n";
        let kinds = kinds(source);
        // Tab width equals four spaces, so the second line stays in the block.
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Indent).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Dedent).count(), 1);
    }

    #[test]
    fn test_newline_tokens_emitted() {
        let kinds = kinds("x\ny\n");
        assert_eq!(
            kinds.iter().filter(|k| **k == TokenKind::Newline).count(),
            2
        );
    }

    #[test]
    fn test_unexpected_character_is_reported_not_fatal() {
        let mut lexer = Lexer::new("x @ y");
        let tokens = lexer.tokenize();
        assert_eq!(lexer.diagnostics().len(), 1);
        let idents: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.text.clone())
            .collect();
        assert_eq!(idents, vec!["x", "y"]);
    }

    #[test]
    fn test_positions_recorded() {
        let tokens = lex("x\n  y");
        let y = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Identifier && t.text == "y")
            .unwrap();
        assert_eq!(y.line, 2);
    }
}
