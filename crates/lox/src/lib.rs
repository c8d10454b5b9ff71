//! A tree-walking interpreter for Lox.
//!
//! The pipeline is `scanner -> parser -> resolver -> interpreter`
//! (`spec.md` §1/§2); [`run`] and [`run_repl_line`] wire the four stages
//! together the way `lox-cli` needs them wired, so the driver crate stays a
//! thin argument-and-exit-code shell around this library, mirroring how
//! thin `ouros-cli` sits on top of `ouros`.

pub mod ast;
pub mod ast_print;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod native;
pub mod parser;
pub mod printer;
pub mod resolver;
pub mod resource;
pub mod scanner;
pub mod token;
pub mod value;

pub use ast::{Expr, FunctionDecl, LiteralValue, NodeId, Stmt};
pub use class::{Class, Instance};
pub use environment::Environment;
pub use error::{CollectingReporter, ErrorReporter, ExecOutcome, RunResult, RuntimeError, StdoutReporter};
pub use function::{Function, NativeFunction};
pub use interpreter::{ControlFlow, Interpreter};
pub use parser::{Parser, ReplInput};
pub use printer::{CollectingPrinter, Printer, StdoutPrinter};
pub use resource::{RecursionGuard, DEFAULT_MAX_CALL_DEPTH};
pub use scanner::Scanner;
pub use token::{Literal, Token, TokenKind};
pub use value::{stringify, Callable, Value};

/// Checkpoint sink for the REPL's `.debug on` toggle (`spec.md` §6): dumps
/// the scanned tokens and parsed statements for each line. The teacher has
/// no `log`/`tracing` dependency of its own; it defines its own `VmTracer`
/// trait for VM instrumentation points instead, which this mirrors.
pub trait Tracer {
    fn trace_tokens(&self, tokens: &[Token]);
    fn trace_statements(&self, statements: &[Stmt]);
    fn trace_expr(&self, expr: &Expr);
}

/// The default: traces nothing.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn trace_tokens(&self, _tokens: &[Token]) {}
    fn trace_statements(&self, _statements: &[Stmt]) {}
    fn trace_expr(&self, _expr: &Expr) {}
}

/// `.debug on`'s backing implementation: dumps to stderr so it never
/// interleaves with `print`'s stdout output (`spec.md` §6).
pub struct StderrTracer;

impl Tracer for StderrTracer {
    fn trace_tokens(&self, tokens: &[Token]) {
        for token in tokens {
            eprintln!("{token}");
        }
    }

    fn trace_statements(&self, statements: &[Stmt]) {
        for statement in statements {
            eprintln!("{statement:?}");
        }
    }

    fn trace_expr(&self, expr: &Expr) {
        eprintln!("{expr:?}");
    }
}

/// Runs a complete program through the full pipeline (`spec.md` §2): scan,
/// parse, and — only if parsing reported no error — resolve, and — only if
/// resolving reported no error — evaluate. Used for file-mode execution.
pub fn run(source: &str, interpreter: &mut Interpreter, reporter: &dyn ErrorReporter, tracer: &dyn Tracer) -> ExecOutcome {
    let tokens = Scanner::new(source).scan_tokens(reporter);
    tracer.trace_tokens(&tokens);

    let mut parser = Parser::new(tokens, reporter);
    let statements = parser.parse();
    tracer.trace_statements(&statements);
    if reporter.had_error() {
        return ExecOutcome::StaticError;
    }

    resolver::resolve(interpreter, &statements, reporter);
    if reporter.had_error() {
        return ExecOutcome::StaticError;
    }

    interpreter.interpret(&statements, reporter);
    if reporter.had_runtime_error() {
        ExecOutcome::RuntimeError
    } else {
        ExecOutcome::Success
    }
}

/// What one REPL line produced: either it ran as a program fragment, or it
/// was a bare expression, in which case the driver gets the value back to
/// stringify itself as `"= <value>"` (`spec.md` §6).
pub enum ReplOutcome {
    Ran(ExecOutcome),
    Value(Value),
}

/// Runs one REPL line through the same pipeline as [`run`], but via
/// `parse_repl` so a trailing bare expression can be reported back as a
/// value instead of executed as a statement (`spec.md` §4.2/§6). `globals`
/// and `locals` persist across calls by reusing the same `interpreter`.
pub fn run_repl_line(
    source: &str,
    interpreter: &mut Interpreter,
    reporter: &dyn ErrorReporter,
    tracer: &dyn Tracer,
) -> ReplOutcome {
    let tokens = Scanner::new(source).scan_tokens(reporter);
    tracer.trace_tokens(&tokens);

    let mut parser = Parser::new(tokens, reporter);
    match parser.parse_repl() {
        ReplInput::Statements(statements) => {
            tracer.trace_statements(&statements);
            if reporter.had_error() {
                return ReplOutcome::Ran(ExecOutcome::StaticError);
            }
            resolver::resolve(interpreter, &statements, reporter);
            if reporter.had_error() {
                return ReplOutcome::Ran(ExecOutcome::StaticError);
            }
            interpreter.interpret(&statements, reporter);
            let outcome = if reporter.had_runtime_error() { ExecOutcome::RuntimeError } else { ExecOutcome::Success };
            ReplOutcome::Ran(outcome)
        }
        ReplInput::Expression(expr) => {
            tracer.trace_expr(&expr);
            if reporter.had_error() {
                return ReplOutcome::Ran(ExecOutcome::StaticError);
            }
            resolver::resolve_expression(interpreter, &expr, reporter);
            if reporter.had_error() {
                return ReplOutcome::Ran(ExecOutcome::StaticError);
            }
            match interpreter.interpret_expression(&expr) {
                Ok(value) => ReplOutcome::Value(value),
                Err(error) => {
                    reporter.runtime_error(&error);
                    ReplOutcome::Ran(ExecOutcome::RuntimeError)
                }
            }
        }
    }
}
