//! Full-pipeline scenarios, one per numbered case in `spec.md` §8.

use std::rc::Rc;

use lox::{run, CollectingPrinter, CollectingReporter, ExecOutcome, Interpreter, NoopTracer};
use pretty_assertions::assert_eq;

/// Runs `source` through the whole pipeline and returns everything `print`
/// wrote, the outcome the driver would use to pick an exit code, and every
/// diagnostic line the reporter collected.
fn run_collecting(source: &str) -> (String, ExecOutcome, Vec<String>) {
    let printer = Rc::new(CollectingPrinter::new());
    let mut interpreter = Interpreter::with_printer(Box::new(Rc::clone(&printer)));
    let reporter = CollectingReporter::new();
    let outcome = run(source, &mut interpreter, &reporter, &NoopTracer);
    (printer.output(), outcome, reporter.messages())
}

#[test]
fn scenario_1_arithmetic_precedence() {
    let (stdout, outcome, _) = run_collecting("print 3 + 3 * -3;");
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "-6\n");
}

#[test]
fn scenario_2_block_shadowing() {
    let (stdout, outcome, _) = run_collecting("var a = 1; { var a = 2; print a; } print a;");
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "2\n1\n");
}

#[test]
fn scenario_3_closures_capture_by_reference() {
    let source = "fun mk(){ var i = 0; fun inc(){ i = i + 1; return i; } return inc; } \
                  var f = mk(); print f(); print f(); print f();";
    let (stdout, outcome, _) = run_collecting(source);
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "1\n2\n3\n");
}

#[test]
fn scenario_4_class_init_and_method() {
    let source = "class C { init(x){ this.x = x; } get(){ return this.x; } } \
                  var c = C(42); print c.get();";
    let (stdout, outcome, _) = run_collecting(source);
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "42\n");
}

#[test]
fn scenario_5_for_loop() {
    let (stdout, outcome, _) = run_collecting("for (var i = 0; i < 3; i = i + 1) print i;");
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "0\n1\n2\n");
}

#[test]
fn scenario_6_string_minus_number_is_runtime_error() {
    let (_, outcome, messages) = run_collecting("\"3\" - 1;");
    assert_eq!(outcome, ExecOutcome::RuntimeError);
    assert!(messages.iter().any(|line| line.contains("Operands must be numbers")));
}

#[test]
fn boundary_unterminated_string_is_static_error() {
    let (_, outcome, messages) = run_collecting("var a = \"unterminated;");
    assert_eq!(outcome, ExecOutcome::StaticError);
    assert!(messages.iter().any(|line| line.contains("Unterminated string.")));
}

#[test]
fn boundary_self_referential_initializer_is_resolve_error() {
    let (_, outcome, messages) = run_collecting("{ var a = a; }");
    assert_eq!(outcome, ExecOutcome::StaticError);
    assert!(messages.iter().any(|line| line.contains("own initializer")));
}

#[test]
fn boundary_return_value_from_initializer_is_resolve_error() {
    let source = "class C { init(){ return 1; } }";
    let (_, outcome, messages) = run_collecting(source);
    assert_eq!(outcome, ExecOutcome::StaticError);
    assert!(messages.iter().any(|line| line.contains("return a value from an initializer")));
}

#[test]
fn boundary_too_many_parameters_is_parse_error() {
    let params: Vec<String> = (0..256).map(|i| format!("p{i}")).collect();
    let source = format!("fun f({}) {{ return 1; }}", params.join(", "));
    let (_, outcome, messages) = run_collecting(&source);
    assert_eq!(outcome, ExecOutcome::StaticError);
    assert!(messages.iter().any(|line| line.contains("Can't have more than 255 parameters")));
}

#[test]
fn boundary_nested_block_comment_parses_cleanly() {
    let (stdout, outcome, _) = run_collecting("/* a /* b */ c */ print 1;");
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "1\n");
}

#[test]
fn constructor_returns_this_despite_bare_return() {
    let source = "class C { init(){ this.ready = true; return; } } print C().ready;";
    let (stdout, outcome, _) = run_collecting(source);
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "true\n");
}

#[test]
fn division_by_zero_yields_nan_not_an_error() {
    let (stdout, outcome, _) = run_collecting("print (0 / 0 != 0 / 0);");
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "true\n");
}

#[test]
fn truthiness_zero_and_empty_string_are_truthy() {
    let (stdout, outcome, _) = run_collecting("print 0 ? \"yes\" : \"no\"; print \"\" ? \"yes\" : \"no\";");
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "yes\nyes\n");
}

#[test]
fn unused_local_variable_is_a_static_error() {
    let (_, outcome, messages) = run_collecting("{ var unused = 1; }");
    assert_eq!(outcome, ExecOutcome::StaticError);
    assert!(messages.iter().any(|line| line.contains("Unused local variable")));
}

#[test]
fn ternary_then_branch_swallows_comma_per_open_question() {
    // `a ? b, c : d` parses as `a ? (b, c) : d` (spec.md §9 Open Questions) —
    // the comma is swallowed into the then-branch, so only `c` ever prints.
    let source = "print true ? (1, 2) : 3;";
    let (stdout, outcome, _) = run_collecting(source);
    assert_eq!(outcome, ExecOutcome::Success);
    assert_eq!(stdout, "2\n");
}
