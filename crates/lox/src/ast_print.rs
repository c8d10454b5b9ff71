//! Canonical Lisp-style re-emission of the AST.
//!
//! `spec.md` §8 names one universal property: `parse(scan(src))` should be
//! idempotent over re-emission through a canonical printer — i.e. printing a
//! parsed program, then re-scanning/re-parsing the printed form, should
//! produce a structurally identical AST. Grounded directly on
//! `original_source/lox/printer.py`'s `AstPrinter` (itself marked
//! `# untested` there — this is the implementation that test now exercises).
//! Not used by the evaluator or the driver; it exists purely as the fixture
//! `tests/ast_print.rs`'s round-trip test needs.

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::value::format_number;

/// Prints one expression as a fully-parenthesized Lisp-style form, e.g.
/// `1 + 2 * 3` becomes `(+ 1 (* 2 3))`.
pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Assign { name, value, .. } => parens(&format!("= {}", name.lexeme), vec![print_expr(value)]),
        Expr::Binary { left, operator, right, .. } => {
            parens(&operator.lexeme, vec![print_expr(left), print_expr(right)])
        }
        Expr::Call { callee, args, .. } => {
            let mut parts = vec![print_expr(callee)];
            parts.extend(args.iter().map(print_expr));
            format!("(call {})", parts.join(" "))
        }
        Expr::Conditional { condition, then_branch, else_branch, .. } => {
            parens("?:", vec![print_expr(condition), print_expr(then_branch), print_expr(else_branch)])
        }
        Expr::Get { object, name, .. } => format!("(get {} {})", print_expr(object), name.lexeme),
        Expr::Grouping { inner, .. } => parens("group", vec![print_expr(inner)]),
        Expr::Literal { value, .. } => print_literal(value),
        Expr::Logical { left, operator, right, .. } => {
            parens(&operator.lexeme, vec![print_expr(left), print_expr(right)])
        }
        Expr::Set { object, name, value, .. } => {
            format!("(set {} {} {})", print_expr(object), name.lexeme, print_expr(value))
        }
        Expr::This { .. } => "(this)".to_owned(),
        Expr::Unary { operator, right, .. } => parens(&operator.lexeme, vec![print_expr(right)]),
        Expr::Variable { name, .. } => format!("(variable {})", name.lexeme),
    }
}

fn print_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Number(n) => format_number(*n),
        LiteralValue::Str(s) => s.clone(),
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Nil => "nil".to_owned(),
    }
}

fn parens(name: &str, rendered: Vec<String>) -> String {
    format!("({name} {})", rendered.join(" "))
}

/// Prints a full statement list, one form per line, the way the Python
/// `AstPrinter.print` joins its statements with `\n`.
pub fn print_statements(statements: &[Stmt]) -> String {
    statements.iter().map(print_stmt).collect::<Vec<_>>().join("\n")
}

fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Block(statements) => {
            let inner = print_statements(statements);
            let indented: Vec<String> = inner.split('\n').map(|line| format!("  {line}")).collect();
            format!("(block\n{})", indented.join("\n"))
        }
        Stmt::Break { .. } => "(break)".to_owned(),
        Stmt::Class { name, .. } => format!("(class {})", name.lexeme),
        Stmt::Expression(expr) => format!("(expression {})", print_expr(expr)),
        Stmt::Function(declaration) => format!("(fun {})", declaration.name.lexeme),
        Stmt::If { condition, then_branch, else_branch } => {
            let else_form = else_branch.as_ref().map_or_else(|| "nil".to_owned(), |stmt| print_stmt(stmt));
            format!("(if {} {} {})", print_expr(condition), print_stmt(then_branch), else_form)
        }
        Stmt::Print(expr) => format!("(print {})", print_expr(expr)),
        Stmt::Return { value, .. } => {
            value.as_ref().map_or_else(|| "(return)".to_owned(), |value| format!("(return {})", print_expr(value)))
        }
        Stmt::Var { name, initializer } => {
            let initializer = initializer.as_ref().map_or_else(|| "nil".to_owned(), |expr| print_expr(expr));
            format!("(var {} {initializer})", name.lexeme)
        }
        Stmt::While { condition, body } => format!("(while {} {})", print_expr(condition), print_stmt(body)),
    }
}
