//! `lox [script]` — run a Lox file, or start the REPL with no arguments
//! (`spec.md` §6). Mirrors `ouros-cli`'s shape: a thin argument/exit-code
//! shell over the library crate, no `clap` (the teacher has none either —
//! one optional positional argument doesn't need a parser).

use std::env;
use std::fs;
use std::process::ExitCode;

use lox::{ExecOutcome, Interpreter, NoopTracer, StdoutPrinter, StdoutReporter, DEFAULT_MAX_CALL_DEPTH};

mod repl;

/// Parsed command line: an optional `--max-depth N` override (shared by both
/// file mode and the REPL) plus at most one positional script path.
struct Args {
    max_depth: usize,
    script: Option<String>,
}

fn parse_args(raw: &[String]) -> Result<Args, &'static str> {
    let mut max_depth = DEFAULT_MAX_CALL_DEPTH;
    let mut script = None;
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--max-depth" => {
                let value = iter.next().ok_or("--max-depth requires a value")?;
                max_depth = value.parse().map_err(|_| "--max-depth expects a positive integer")?;
            }
            _ if script.is_none() => script = Some(arg.clone()),
            _ => return Err("too many arguments"),
        }
    }
    Ok(Args { max_depth, script })
}

fn main() -> ExitCode {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("Usage: lox [--max-depth N] [script]\n{message}");
            return ExitCode::from(64);
        }
    };
    match args.script {
        Some(script) => run_file(&script, args.max_depth),
        None => repl::run(args.max_depth),
    }
}

fn run_file(path: &str, max_depth: usize) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Could not read '{path}': {error}");
            return ExitCode::from(64);
        }
    };

    let reporter = StdoutReporter::new();
    let mut interpreter = Interpreter::with_printer_and_max_depth(Box::new(StdoutPrinter), max_depth);
    match lox::run(&source, &mut interpreter, &reporter, &NoopTracer) {
        ExecOutcome::Success => ExitCode::SUCCESS,
        ExecOutcome::StaticError => ExitCode::from(65),
        ExecOutcome::RuntimeError => ExitCode::from(70),
    }
}
