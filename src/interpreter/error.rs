use std::fmt;

/// Runtime exception raised by `throw`, unknown call targets and failed
/// imports. Carries the message a user `catch` binds and the source line
/// where it was raised. Uncaught, it terminates the run with a nonzero
/// exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmniError {
    pub message: String,
    pub line: usize,
}

impl OmniError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }

    /// An error raised from a context without position information, such
    /// as a native built-in. The evaluator stamps the current line on it
    /// at the call site.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message, 0)
    }

    pub fn unknown_function(name: &str, line: usize) -> Self {
        Self::new(format!("Unknown function: {}", name), line)
    }

    pub fn import_failure(module: &str, line: usize) -> Self {
        Self::new(format!("Cannot import: {}", module), line)
    }

    pub fn with_line(mut self, line: usize) -> Self {
        if self.line == 0 {
            self.line = line;
        }
        self
    }
}

impl fmt::Display for OmniError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime Error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for OmniError {}
