//! Recursive-descent parser.
//!
//! Grammar and error-recovery shape straight out of `loxothon`'s `parser.py`
//! (`spec.md` §4.2), translated from its `ParseError`-raising methods into
//! `Result`-returning ones — the idiomatic Rust rendition of the same
//! panic-mode recovery: a bad `consume` returns `Err(ParseError)`, caught one
//! level up by `declaration`, which calls `synchronize` and moves on.

use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::error::ErrorReporter;
use crate::token::{Literal, Token, TokenKind};

/// A local, silent marker — the diagnostic itself was already handed to the
/// `ErrorReporter` at the point of failure. Mirrors `loxothon`'s internal
/// `ParseError` exception, used only for control flow back to `declaration`.
struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

/// What `parse_repl` produced: a full program, or — if the line ended in an
/// expression with no trailing `;` — that bare expression (`spec.md` §4.2,
/// §6).
pub enum ReplInput {
    Statements(Vec<Stmt>),
    Expression(Expr),
}

pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    reporter: &'a dyn ErrorReporter,
    allow_expression: bool,
    found_expression: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, reporter: &'a dyn ErrorReporter) -> Self {
        Self { tokens, current: 0, reporter, allow_expression: false, found_expression: false }
    }

    /// `program := declaration* EOF`.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    /// Only the first declaration on the line is allowed to resolve to a
    /// bare trailing expression, matching `loxothon`'s REPL loop: each input
    /// line gets one chance to be "just an expression".
    pub fn parse_repl(&mut self) -> ReplInput {
        self.allow_expression = true;
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                if self.found_expression {
                    if let Stmt::Expression(expr) = stmt {
                        return ReplInput::Expression(expr);
                    }
                }
                statements.push(stmt);
            }
            self.allow_expression = false;
        }
        ReplInput::Statements(statements)
    }

    // ---- declarations ----------------------------------------------------

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_token(&[TokenKind::Class]) {
            self.class_declaration()
        } else if self.match_token(&[TokenKind::Fun]) {
            self.function_declaration()
        } else if self.match_token(&[TokenKind::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };
        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect class name.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        let mut class_methods = Vec::new();
        let mut getters = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            let is_class_method = self.match_token(&[TokenKind::Class]);
            let decl = Rc::new(self.function("method")?);
            if is_class_method {
                class_methods.push(decl);
            } else if decl.is_getter {
                getters.push(decl);
            } else {
                methods.push(decl);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after class body.")?;
        Ok(Stmt::Class { name, methods, class_methods, getters })
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        Ok(Stmt::Function(Rc::new(self.function("function")?)))
    }

    /// `function := IDENT "(" params? ")" block | IDENT block` — the second
    /// form (no parameter list) only arises for `kind == "method"` and is a
    /// getter (`spec.md` §4.2).
    fn function(&mut self, kind: &str) -> ParseResult<FunctionDecl> {
        let name = self.consume(TokenKind::Identifier, &format!("Expect {kind} name."))?;
        let is_getter = kind == "method" && self.check(TokenKind::LeftBrace);

        let mut params = Vec::new();
        if !is_getter {
            self.consume(TokenKind::LeftParen, &format!("Expect '(' after {kind} name."))?;
            if !self.check(TokenKind::RightParen) {
                loop {
                    if params.len() >= 255 {
                        self.report_at_current("Can't have more than 255 parameters.");
                    }
                    params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                    if !self.match_token(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        }

        self.consume(TokenKind::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;
        // The grammar in `spec.md` §4.2 has no setter syntax, so `is_setter`
        // is never produced by this parser despite being part of the
        // `Function` statement's data model (`spec.md` §3).
        Ok(FunctionDecl { name, params, body, is_getter, is_setter: false })
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.match_token(&[TokenKind::Equal]) { Some(self.expression()?) } else { None };
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    // ---- statements --------------------------------------------------------

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.match_token(&[TokenKind::For]) {
            self.for_statement()
        } else if self.match_token(&[TokenKind::If]) {
            self.if_statement()
        } else if self.match_token(&[TokenKind::Print]) {
            self.print_statement()
        } else if self.match_token(&[TokenKind::Return]) {
            self.return_statement()
        } else if self.match_token(&[TokenKind::While]) {
            self.while_statement()
        } else if self.match_token(&[TokenKind::Break]) {
            self.break_statement()
        } else if self.match_token(&[TokenKind::LeftBrace]) {
            Ok(Stmt::Block(self.block()?))
        } else {
            self.expression_statement()
        }
    }

    /// Desugars into `Block([init, While(cond, Block([body, Expression(incr)]))])`
    /// (`spec.md` §4.2) — there is no `For` AST node.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_token(&[TokenKind::Semicolon]) {
            None
        } else if self.match_token(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition =
            if !self.check(TokenKind::Semicolon) { self.expression()? } else { Expr::literal(LiteralValue::Bool(true)) };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenKind::RightParen) { Some(self.expression()?) } else { None };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;
        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }
        body = Stmt::While { condition, body: Box::new(body) };
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }
        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(&[TokenKind::Else]) { Some(Box::new(self.statement()?)) } else { None };
        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenKind::Semicolon) { Some(self.expression()?) } else { None };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn break_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        self.consume(TokenKind::Semicolon, "Expect ';' after 'break'.")?;
        Ok(Stmt::Break { keyword })
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        if self.allow_expression && self.check(TokenKind::Eof) {
            self.found_expression = true;
        } else {
            self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        }
        Ok(Stmt::Expression(expr))
    }

    // ---- expressions, highest-precedence last ------------------------------

    fn expression(&mut self) -> ParseResult<Expr> {
        self.comma()
    }

    /// Left-associative; yields the right operand at runtime (`spec.md`
    /// §4.5).
    fn comma(&mut self) -> ParseResult<Expr> {
        let mut expr = self.assignment()?;
        while self.match_token(&[TokenKind::Comma]) {
            let operator = self.previous().clone();
            let right = self.assignment()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    /// Parses a `conditional` first, then reinterprets the LHS if `=`
    /// follows. An unsupported target is a reported-but-non-fatal error
    /// (`spec.md` §4.2).
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.conditional()?;
        if self.match_token(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::assign(name, value)),
                Expr::Get { object, name, .. } => Ok(Expr::set(*object, name, value)),
                _ => {
                    self.reporter.error_token(&equals, "Invalid assignment target.");
                    Ok(expr)
                }
            };
        }
        Ok(expr)
    }

    /// Right-associative ternary: `then_branch` is a full `expression`
    /// (including comma), `else_branch` recurses into `conditional` — kept
    /// verbatim per `spec.md` §9's Open Questions.
    fn conditional(&mut self) -> ParseResult<Expr> {
        let expr = self.logic_or()?;
        if self.match_token(&[TokenKind::Question]) {
            let then_branch = self.expression()?;
            self.consume(TokenKind::Colon, "Expect ':' after then branch of conditional expression.")?;
            let else_branch = self.conditional()?;
            return Ok(Expr::conditional(expr, then_branch, else_branch));
        }
        Ok(expr)
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.match_token(&[TokenKind::Or]) {
            let operator = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::logical(expr, operator, right);
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.match_token(&[TokenKind::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::logical(expr, operator, right);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;
        while self.match_token(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;
        while self.match_token(&[TokenKind::Greater, TokenKind::GreaterEqual, TokenKind::Less, TokenKind::LessEqual]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;
        while self.match_token(&[TokenKind::Minus, TokenKind::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;
        while self.match_token(&[TokenKind::Slash, TokenKind::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_token(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::unary(operator, right));
        }
        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.match_token(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(&[TokenKind::Dot]) {
                let name = self.consume(TokenKind::Identifier, "Expect property name after '.'.")?;
                expr = Expr::get(expr, name);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Arguments parse via `assignment`, not `comma` — a bare `comma` would
    /// swallow the argument separators themselves (`spec.md` §9 Open
    /// Questions).
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= 255 {
                    self.report_at_current("Can't have more than 255 arguments.");
                }
                args.push(self.assignment()?);
                if !self.match_token(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::call(callee, paren, args))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.match_token(&[TokenKind::False]) {
            return Ok(Expr::literal(LiteralValue::Bool(false)));
        }
        if self.match_token(&[TokenKind::True]) {
            return Ok(Expr::literal(LiteralValue::Bool(true)));
        }
        if self.match_token(&[TokenKind::Nil]) {
            return Ok(Expr::literal(LiteralValue::Nil));
        }
        if self.match_token(&[TokenKind::Number]) {
            let value = match &self.previous().literal {
                Literal::Number(n) => *n,
                _ => unreachable!("scanner always attaches a Number literal to a NUMBER token"),
            };
            return Ok(Expr::literal(LiteralValue::Number(value)));
        }
        if self.match_token(&[TokenKind::String]) {
            let value = match &self.previous().literal {
                Literal::Str(s) => s.clone(),
                _ => unreachable!("scanner always attaches a Str literal to a STRING token"),
            };
            return Ok(Expr::literal(LiteralValue::Str(value)));
        }
        if self.match_token(&[TokenKind::This]) {
            return Ok(Expr::this(self.previous().clone()));
        }
        if self.match_token(&[TokenKind::Identifier]) {
            return Ok(Expr::variable(self.previous().clone()));
        }
        if self.match_token(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::grouping(expr));
        }
        Err(self.error_at_current("Expect expression."))
    }

    // ---- token-stream plumbing ---------------------------------------------

    fn match_token(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            let token = self.peek().clone();
            self.advance();
            Ok(token)
        } else {
            Err(self.error_at_current(message))
        }
    }

    /// Reports at the current token and returns a `ParseError` to propagate
    /// with `?`.
    fn error_at_current(&self, message: &str) -> ParseError {
        self.reporter.error_token(self.peek(), message);
        ParseError
    }

    /// Reports without producing a `ParseError` — for diagnostics that
    /// shouldn't interrupt parsing (too many args/params, `spec.md` §4.2).
    fn report_at_current(&self, message: &str) {
        self.reporter.error_token(self.peek(), message);
    }

    /// Discards tokens until just after a `;` or right before one of the
    /// statement-starting keywords (`spec.md` §4.2).
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if matches!(
                self.peek().kind,
                TokenKind::Class
                    | TokenKind::Var
                    | TokenKind::For
                    | TokenKind::If
                    | TokenKind::While
                    | TokenKind::Print
                    | TokenKind::Return
            ) {
                return;
            }
            self.advance();
        }
    }
}
