//! Recursive-descent parsing (`spec.md` §4.2).

use lox::{CollectingReporter, Expr, Parser, Scanner, Stmt};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> (Vec<Stmt>, CollectingReporter) {
    let reporter = CollectingReporter::new();
    let tokens = Scanner::new(source).scan_tokens(&reporter);
    let mut parser = Parser::new(tokens, &reporter);
    (parser.parse(), reporter)
}

#[test]
fn for_statement_desugars_to_block_with_while() {
    let (statements, reporter) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
    assert!(!reporter.had_error());
    assert_eq!(statements.len(), 1);
    match &statements[0] {
        Stmt::Block(inner) => {
            assert_eq!(inner.len(), 2);
            assert!(matches!(inner[0], Stmt::Var { .. }));
            match &inner[1] {
                Stmt::While { body, .. } => match body.as_ref() {
                    Stmt::Block(while_body) => assert_eq!(while_body.len(), 2),
                    other => panic!("expected a block body, got {other:?}"),
                },
                other => panic!("expected a desugared While, got {other:?}"),
            }
        }
        other => panic!("expected a desugared Block, got {other:?}"),
    }
}

#[test]
fn for_with_missing_condition_defaults_to_true() {
    let (statements, reporter) = parse("for (;;) break;");
    assert!(!reporter.had_error());
    match &statements[0] {
        Stmt::While { condition, .. } => assert!(matches!(condition, Expr::Literal { .. })),
        other => panic!("expected While, got {other:?}"),
    }
}

#[test]
fn invalid_assignment_target_reports_but_does_not_abort() {
    let (statements, reporter) = parse("1 = 2; print \"still parses\";");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Invalid assignment target.")));
    assert_eq!(statements.len(), 2);
}

#[test]
fn too_many_arguments_reports_but_parsing_continues() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", args.join(", "));
    let (statements, reporter) = parse(&source);
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Can't have more than 255 arguments.")));
    assert_eq!(statements.len(), 1);
}

#[test]
fn panic_mode_sync_recovers_at_next_statement() {
    // The stray `)` is a parse error; synchronize should skip to the next
    // statement boundary and still parse the `print` that follows.
    let (statements, reporter) = parse(")); print 1;");
    assert!(reporter.had_error());
    assert_eq!(statements.len(), 1);
    assert!(matches!(statements[0], Stmt::Print(_)));
}

#[test]
fn getter_method_has_no_parameter_list() {
    let (statements, reporter) = parse("class C { value { return 1; } }");
    assert!(!reporter.had_error());
    match &statements[0] {
        Stmt::Class { getters, methods, .. } => {
            assert_eq!(getters.len(), 1);
            assert!(methods.is_empty());
            assert!(getters[0].is_getter);
            assert!(getters[0].params.is_empty());
        }
        other => panic!("expected Class, got {other:?}"),
    }
}

#[test]
fn class_prefixed_methods_land_in_class_methods() {
    let (statements, reporter) = parse("class C { class helper() { return 1; } }");
    assert!(!reporter.had_error());
    match &statements[0] {
        Stmt::Class { class_methods, methods, .. } => {
            assert_eq!(class_methods.len(), 1);
            assert!(methods.is_empty());
        }
        other => panic!("expected Class, got {other:?}"),
    }
}

#[test]
fn comma_operator_is_left_associative_binary() {
    let (statements, reporter) = parse("1, 2, 3;");
    assert!(!reporter.had_error());
    match &statements[0] {
        Stmt::Expression(Expr::Binary { left, .. }) => {
            // outermost comma's left operand is itself a comma expression
            assert!(matches!(left.as_ref(), Expr::Binary { .. }));
        }
        other => panic!("expected a Binary comma expression, got {other:?}"),
    }
}

#[test]
fn ternary_else_branch_recurses_into_conditional_not_comma() {
    let (statements, reporter) = parse("a ? 1, 2 : 3;");
    // `a` is undeclared but that's a resolver/runtime concern, not a parse
    // error — this only checks the shape the grammar produces.
    assert!(!reporter.had_error());
    match &statements[0] {
        Stmt::Expression(Expr::Conditional { then_branch, else_branch, .. }) => {
            assert!(matches!(then_branch.as_ref(), Expr::Binary { .. }));
            assert!(matches!(else_branch.as_ref(), Expr::Literal { .. }));
        }
        other => panic!("expected Conditional, got {other:?}"),
    }
}

#[test]
fn call_and_get_chain_left_to_right() {
    let (statements, reporter) = parse("a.b.c();");
    assert!(!reporter.had_error());
    match &statements[0] {
        Stmt::Expression(Expr::Call { callee, .. }) => {
            assert!(matches!(callee.as_ref(), Expr::Get { .. }));
        }
        other => panic!("expected Call, got {other:?}"),
    }
}
