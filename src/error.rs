// ABOUTME: Error types and the shared error-reporting sink

use crate::token::{Token, TokenType};
use crate::value::Value;
use std::cell::Cell;
use thiserror::Error;

/// Signals a grammar violation or invalid-assignment-target error. Carries no
/// payload: by the time one is constructed the reporter has already emitted
/// the diagnostic, so the parser only needs the value to drive panic-mode
/// recovery via `?` and `synchronize`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("parse error")]
pub struct ParseError;

/// A runtime error raised while evaluating the AST. Carries the triggering
/// line (read off the offending token) so the CLI can format it per the
/// `{message}\n[line N]` contract.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        RuntimeError {
            message: message.into(),
            line: token.line,
        }
    }

    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        RuntimeError {
            message: message.into(),
            line,
        }
    }
}

/// The interpreter's internal unwind channel. A `return` statement and a
/// runtime error both unwind the Rust call stack via `?`, but they must never
/// be confused with one another: `Return` is captured at the nearest
/// function-call boundary and turned back into an `Ok(Value)`, while `Error`
/// keeps propagating until it reaches the top of `interpret`.
#[derive(Debug, Clone)]
pub enum Unwind {
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(err)
    }
}

/// Shared sink for scan/parse and runtime diagnostics. A single `Reporter`
/// is threaded through the scanner, parser, and interpreter for one `run`
/// invocation so the two sticky flags can decide the process exit code.
pub struct Reporter {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter {
            had_error: Cell::new(false),
            had_runtime_error: Cell::new(false),
        }
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    /// Clears both sticky flags. Called by the REPL between lines.
    pub fn reset(&self) {
        self.had_error.set(false);
        self.had_runtime_error.set(false);
    }

    pub fn error(&self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    pub fn error_at_token(&self, token: &Token, message: &str) {
        if token.kind == TokenType::Eof {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    fn report(&self, line: usize, whence: &str, message: &str) {
        eprintln!("[line {line}] Error{whence}: {message}");
        self.had_error.set(true);
    }

    pub fn runtime_error(&self, err: &RuntimeError) {
        eprintln!("{}\n[line {}]", err.message, err.line);
        self.had_runtime_error.set(true);
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Literal;

    #[test]
    fn error_at_non_eof_token_formats_lexeme() {
        let reporter = Reporter::new();
        let token = Token::new(TokenType::Identifier, "foo", Literal::None, 3);
        reporter.error_at_token(&token, "Expect expression.");
        assert!(reporter.had_error());
    }

    #[test]
    fn reset_clears_both_flags() {
        let reporter = Reporter::new();
        reporter.error(1, "oops");
        reporter.runtime_error(&RuntimeError::at_line(1, "bad"));
        assert!(reporter.had_error());
        assert!(reporter.had_runtime_error());
        reporter.reset();
        assert!(!reporter.had_error());
        assert!(!reporter.had_runtime_error());
    }
}
