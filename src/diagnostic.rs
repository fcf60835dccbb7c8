//! Line-based diagnostics for the lexer and parser.
//!
//! The runtime has its own exception type; this module only covers the
//! front half of the pipeline, where errors are reported and recovery
//! continues so several problems can surface in one run.

use owo_colors::OwoColorize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Which pipeline stage produced the diagnostic; controls the rendered
/// prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    pub line: usize,
}

impl Diagnostic {
    pub fn lex_error(message: impl Into<String>, line: usize) -> Self {
        Self {
            severity: Severity::Error,
            stage: Stage::Lex,
            message: message.into(),
            line,
        }
    }

    pub fn parse_error(message: impl Into<String>, line: usize) -> Self {
        Self {
            severity: Severity::Error,
            stage: Stage::Parse,
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::Lex => write!(f, "Lex Error: {} at line {}", self.message, self.line),
            Stage::Parse => write!(f, "Parse Error: {} at line {}", self.message, self.line),
        }
    }
}

/// Renders diagnostics one per line, colored when the output supports it.
pub fn render_diagnostics(diagnostics: &[Diagnostic], use_color: bool) -> String {
    let mut out = String::new();
    for diag in diagnostics {
        let rendered = diag.to_string();
        if use_color {
            match diag.severity {
                Severity::Error => out.push_str(&rendered.red().bold().to_string()),
                Severity::Warning => out.push_str(&rendered.yellow().to_string()),
            }
        } else {
            out.push_str(&rendered);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_format() {
        let diag = Diagnostic::parse_error("Expected ':' after if condition", 7);
        assert_eq!(
            diag.to_string(),
            "Parse Error: Expected ':' after if condition at line 7"
        );
    }

    #[test]
    fn test_render_without_color() {
        let diags = vec![
            Diagnostic::lex_error("unexpected character '@'", 1),
            Diagnostic::parse_error("Expected ')'", 2),
        ];
        let rendered = render_diagnostics(&diags, false);
        assert_eq!(
            rendered,
            "Lex Error: unexpected character '@' at line 1\nParse Error: Expected ')' at line 2\n"
        );
    }
}
