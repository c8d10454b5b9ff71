//! Lexical scanning (`spec.md` §4.1).

use lox::{CollectingReporter, Literal, Scanner, TokenKind};
use pretty_assertions::assert_eq;

fn scan(source: &str) -> (Vec<TokenKind>, CollectingReporter) {
    let reporter = CollectingReporter::new();
    let tokens = Scanner::new(source).scan_tokens(&reporter);
    (tokens.into_iter().map(|t| t.kind).collect(), reporter)
}

#[test]
fn single_and_double_char_operators() {
    let (kinds, reporter) = scan("!= == <= >= < > / * - + ? :");
    assert!(!reporter.had_error());
    assert_eq!(
        kinds,
        vec![
            TokenKind::BangEqual,
            TokenKind::EqualEqual,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Slash,
            TokenKind::Star,
            TokenKind::Minus,
            TokenKind::Plus,
            TokenKind::Question,
            TokenKind::Colon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn line_comment_runs_to_eol() {
    let (kinds, reporter) = scan("1 // a comment\n2");
    assert!(!reporter.had_error());
    assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
}

#[test]
fn nestable_block_comment_closes_once() {
    let (kinds, reporter) = scan("/* a /* b */ c */ 1");
    assert!(!reporter.had_error());
    assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Eof]);
}

#[test]
fn unterminated_block_comment_reports_error() {
    let (_, reporter) = scan("/* never closed");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Unterminated block comment.")));
}

#[test]
fn unterminated_string_reports_error_but_keeps_scanning() {
    let (kinds, reporter) = scan("\"oops\n1;");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Unterminated string.")));
    // Scanning continues past the bad string (category-1 errors never abort).
    assert!(kinds.contains(&TokenKind::Semicolon));
}

#[test]
fn string_literal_can_span_multiple_lines() {
    let reporter = CollectingReporter::new();
    let tokens = Scanner::new("\"line one\nline two\"").scan_tokens(&reporter);
    assert!(!reporter.had_error());
    match &tokens[0].literal {
        Literal::Str(s) => assert_eq!(s, "line one\nline two"),
        other => panic!("expected a string literal, got {other:?}"),
    }
}

#[test]
fn number_with_fraction() {
    let reporter = CollectingReporter::new();
    let tokens = Scanner::new("3.14").scan_tokens(&reporter);
    match &tokens[0].literal {
        Literal::Number(n) => assert!((n - 3.14).abs() < f64::EPSILON),
        other => panic!("expected a number literal, got {other:?}"),
    }
}

#[test]
fn trailing_dot_not_followed_by_digit_lexes_as_number_then_dot() {
    let (kinds, reporter) = scan("42.foo");
    assert!(!reporter.had_error());
    assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Dot, TokenKind::Identifier, TokenKind::Eof]);
}

#[test]
fn keyword_table_recognizes_every_keyword() {
    let (kinds, reporter) = scan("and break class else false for fun if nil or print return super this true var while");
    assert!(!reporter.had_error());
    assert_eq!(
        kinds,
        vec![
            TokenKind::And,
            TokenKind::Break,
            TokenKind::Class,
            TokenKind::Else,
            TokenKind::False,
            TokenKind::For,
            TokenKind::Fun,
            TokenKind::If,
            TokenKind::Nil,
            TokenKind::Or,
            TokenKind::Print,
            TokenKind::Return,
            TokenKind::Super,
            TokenKind::This,
            TokenKind::True,
            TokenKind::Var,
            TokenKind::While,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unexpected_character_reports_error_and_continues() {
    let (kinds, reporter) = scan("1 @ 2");
    assert!(reporter.had_error());
    assert!(reporter.messages().iter().any(|m| m.contains("Unexpected character.")));
    assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
}

#[test]
fn whitespace_forms_are_all_skipped() {
    let (kinds, reporter) = scan("1\t\r2\x0c3\x0b4");
    assert!(!reporter.had_error());
    assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Number, TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
}
