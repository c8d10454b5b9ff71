//! The interactive REPL (`spec.md` §6), following `loxothon`'s
//! `run_prompt`: one persistent `Interpreter` for the whole session (so
//! globals and closures survive across lines), `.debug on`/`.debug off`
//! toggling a token/AST dump, and bare expressions echoed as `"= <value>"`.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use lox::{stringify, ExecOutcome, Interpreter, NoopTracer, ReplOutcome, StderrTracer, StdoutPrinter, StdoutReporter, Tracer};

pub fn run(max_depth: usize) -> ExitCode {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut interpreter = Interpreter::with_printer_and_max_depth(Box::new(StdoutPrinter), max_depth);
    let reporter = StdoutReporter::new();
    let mut debug = false;
    let mut had_runtime_error = false;

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        let bytes_read = match input.read_line(&mut line) {
            Ok(n) => n,
            Err(_) => break,
        };
        if bytes_read == 0 {
            break; // EOF
        }
        let line = line.trim_end();

        match line {
            ".debug on" => {
                debug = true;
                continue;
            }
            ".debug off" => {
                debug = false;
                continue;
            }
            "" => continue,
            _ => {}
        }

        // `had_error` resets every input line; `had_runtime_error` does not
        // — the evaluator itself is never re-instantiated (`spec.md` §4.7).
        reporter.reset();
        let noop = NoopTracer;
        let stderr_tracer = StderrTracer;
        let tracer: &dyn Tracer = if debug { &stderr_tracer } else { &noop };

        match lox::run_repl_line(line, &mut interpreter, &reporter, tracer) {
            ReplOutcome::Value(value) => println!("= {}", stringify(&value)),
            ReplOutcome::Ran(ExecOutcome::RuntimeError) => had_runtime_error = true,
            ReplOutcome::Ran(_) => {}
        }
    }

    if had_runtime_error {
        ExitCode::from(70)
    } else {
        ExitCode::SUCCESS
    }
}
