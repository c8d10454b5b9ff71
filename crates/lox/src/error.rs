//! Diagnostic sink and the runtime error type.
//!
//! The teacher has no `log`/`tracing` dependency; diagnostics flow through a
//! small hand-written trait instead (compare `ouros::io::PrintWriter`, which
//! plays the same "pluggable sink" role for `print`). `ErrorReporter` plays
//! that role here for lexical/static/runtime diagnostics, per `spec.md` §4.7.
//!
//! Unlike the `had_error`/`had_runtime_error` *process-global* flags in
//! `loxothon`, the flags live on the reporter instance so a library consumer
//! can run many independent snippets (or an embedder can run one per request)
//! without sharing mutable global state.

use std::cell::Cell;
use std::fmt;

use crate::token::{Token, TokenKind};

/// Sink for static and runtime diagnostics, plus the two sticky flags the
/// driver consults between pipeline phases (`spec.md` §4.7, §7).
pub trait ErrorReporter {
    /// Writes `"[line N] Error<where>: <message>"` and marks `had_error`.
    fn report(&self, line: u32, where_: &str, message: &str);

    /// A lexical or resolver diagnostic with no associated token.
    fn error(&self, line: u32, message: &str) {
        self.report(line, "", message);
    }

    /// A parse or resolve diagnostic anchored to a specific token.
    fn error_token(&self, token: &Token, message: &str) {
        let where_ = if token.kind == TokenKind::Eof {
            " at end".to_owned()
        } else {
            format!(" at '{}'", token.lexeme)
        };
        self.report(token.line, &where_, message);
    }

    /// Writes `"[line N] <message>"` and marks `had_runtime_error`.
    fn runtime_error(&self, error: &RuntimeError);

    fn had_error(&self) -> bool;
    fn had_runtime_error(&self) -> bool;

    /// Clears `had_error` between REPL inputs. `had_runtime_error` is left
    /// alone so a driver can still decide the final process exit code after
    /// a REPL session that hit a runtime error partway through — though the
    /// REPL itself does not consult it between lines.
    fn reset(&self);
}

/// Writes diagnostics to stdout, as `spec.md` §6 specifies ("Diagnostics go
/// to stdout").
#[derive(Debug, Default)]
pub struct StdoutReporter {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl StdoutReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorReporter for StdoutReporter {
    fn report(&self, line: u32, where_: &str, message: &str) {
        println!("[line {line}] Error{where_}: {message}");
        self.had_error.set(true);
    }

    fn runtime_error(&self, error: &RuntimeError) {
        println!("[line {}] {}", error.token.line, error.message);
        self.had_runtime_error.set(true);
    }

    fn had_error(&self) -> bool {
        self.had_error.get()
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    fn reset(&self) {
        self.had_error.set(false);
    }
}

/// Collects every diagnostic line instead of printing it. Mirrors
/// `ouros::io::CollectStringPrint`; used by `lox`'s own tests and by
/// embedders that want to surface diagnostics themselves.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub lines: std::cell::RefCell<Vec<String>>,
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, line: u32, where_: &str, message: &str) {
        self.lines.borrow_mut().push(format!("[line {line}] Error{where_}: {message}"));
        self.had_error.set(true);
    }

    fn runtime_error(&self, error: &RuntimeError) {
        self.lines.borrow_mut().push(format!("[line {}] {}", error.token.line, error.message));
        self.had_runtime_error.set(true);
    }

    fn had_error(&self) -> bool {
        self.had_error.get()
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    fn reset(&self) {
        self.had_error.set(false);
    }
}

/// A runtime (category-4, `spec.md` §7) error: a token for source location
/// plus a message. Evaluation propagates this with `?` the way the teacher's
/// `RunResult<T> = Result<T, RunError>` alias propagates `RunError`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        Self { token, message: message.into() }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] {}", self.token.line, self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result alias for evaluator operations that can fail at runtime, mirroring
/// `ouros::exception_private::RunResult`.
pub type RunResult<T> = Result<T, RuntimeError>;

/// Outcome of running a chunk of source through the full pipeline, used by
/// the driver to pick a process exit code (`spec.md` §6: 0 / 65 / 70).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    Success,
    StaticError,
    RuntimeError,
}
