//! Call-depth limiting (`SPEC_FULL.md` ambient-stack section).

use lox::{run, CollectingPrinter, CollectingReporter, ExecOutcome, Interpreter, NoopTracer};
use pretty_assertions::assert_eq;

fn run_with_depth(source: &str, max_depth: usize) -> (ExecOutcome, Vec<String>) {
    let mut interpreter = Interpreter::with_printer_and_max_depth(Box::new(CollectingPrinter::new()), max_depth);
    let reporter = CollectingReporter::new();
    let outcome = run(source, &mut interpreter, &reporter, &NoopTracer);
    (outcome, reporter.messages())
}

#[test]
fn unbounded_recursion_hits_the_depth_ceiling_instead_of_overflowing_the_host_stack() {
    let source = "fun recurse(n) { return recurse(n + 1); } recurse(0);";
    let (outcome, messages) = run_with_depth(source, 50);
    assert_eq!(outcome, ExecOutcome::RuntimeError);
    assert!(messages.iter().any(|m| m.contains("Stack overflow.")));
}

#[test]
fn ordinary_recursion_well_under_the_ceiling_succeeds() {
    let source = "fun fact(n) { if (n <= 1) return 1; return n * fact(n - 1); } print fact(10);";
    let (outcome, _) = run_with_depth(source, 255);
    assert_eq!(outcome, ExecOutcome::Success);
}

#[test]
fn depth_is_released_after_a_call_returns_so_sibling_calls_are_unaffected() {
    // Each top-level call to `one()` recurses one frame deep and returns; if
    // the guard leaked depth across calls, the tenth call would eventually
    // trip the ceiling even though no single call nests more than one frame.
    let source = "fun one() { return 1; } \
                  for (var i = 0; i < 100; i = i + 1) one();";
    let (outcome, _) = run_with_depth(source, 2);
    assert_eq!(outcome, ExecOutcome::Success);
}
