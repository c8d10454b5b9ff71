//! Static resolution (`spec.md` §4.3).

use lox::{CollectingReporter, Interpreter, Parser, Scanner};

/// Scans, parses, and resolves `source` against a fresh interpreter, handing
/// back whatever the resolver (or an earlier stage) reported.
fn resolve(source: &str) -> CollectingReporter {
    let reporter = CollectingReporter::new();
    let tokens = Scanner::new(source).scan_tokens(&reporter);
    let mut parser = Parser::new(tokens, &reporter);
    let statements = parser.parse();
    if !reporter.had_error() {
        let mut interpreter = Interpreter::new();
        lox::resolver::resolve(&mut interpreter, &statements, &reporter);
    }
    reporter
}

#[test]
fn duplicate_local_in_same_scope_is_an_error() {
    let reporter = resolve("{ var a = 1; var a = 2; }");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Already a variable with this name in this scope.")));
}

#[test]
fn duplicate_global_is_allowed() {
    // The duplicate-local check only applies inside a non-global scope.
    let reporter = resolve("var a = 1; var a = 2; print a;");
    assert!(!reporter.had_error());
}

#[test]
fn return_outside_function_is_an_error() {
    let reporter = resolve("return 1;");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Can't return from top-level code.")));
}

#[test]
fn break_outside_loop_is_an_error() {
    let reporter = resolve("break;");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Can't break outside of a loop.")));
}

#[test]
fn break_inside_nested_function_body_is_still_an_error() {
    // loop_depth is saved/restored across function boundaries, so a bare
    // `break` inside a function nested in a loop is still invalid.
    let reporter = resolve("while (true) { fun f() { break; } }");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Can't break outside of a loop.")));
}

#[test]
fn this_outside_method_is_an_error() {
    let reporter = resolve("print this;");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Can't use 'this' outside of a class.")));
}

#[test]
fn this_inside_method_resolves_cleanly() {
    let reporter = resolve("class C { m() { return this; } }");
    assert!(!reporter.had_error());
}

#[test]
fn unused_local_is_reported_at_scope_exit() {
    let reporter = resolve("fun f() { var unused = 1; }");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Unused local variable 'unused'.")));
}

#[test]
fn used_local_is_not_reported() {
    let reporter = resolve("fun f() { var x = 1; print x; }");
    assert!(!reporter.had_error());
}

#[test]
fn class_scope_this_is_exempt_from_unused_diagnostic() {
    // The synthetic `this` binding a class body pushes must never trigger
    // "unused local variable" even for a method that never references it.
    let reporter = resolve("class C { m() { print 1; } }");
    assert!(!reporter.had_error());
}

#[test]
fn function_forward_reference_to_global_is_allowed() {
    // Globals resolve via the fallback path at call time, so a function can
    // reference another function declared later in the same top level.
    let reporter = resolve("fun a() { return b(); } fun b() { return 1; } print a();");
    assert!(!reporter.had_error());
}
