//! Static resolver.
//!
//! A single AST walk that precomputes, for every variable reference, how
//! many enclosing scopes separate it from its binding — so the evaluator
//! never has to search the scope chain at run time (`spec.md` §4.3). Scope
//! maps use `IndexMap` rather than a hash map so "unused local variable"
//! diagnostics are reported in declaration order, deterministically, the
//! same reason the teacher reaches for `IndexMap` on its own order-sensitive
//! tables.

use indexmap::IndexMap;

use crate::ast::{Expr, FunctionDecl, NodeId, Stmt};
use crate::error::ErrorReporter;
use crate::interpreter::Interpreter;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
}

struct VarState {
    token: Token,
    defined: bool,
    used: bool,
    /// Set for the synthetic `this` binding a class body pushes — exempt
    /// from the unused-local diagnostic (`spec.md` §4.3).
    synthetic: bool,
}

/// Runs one resolution pass, feeding `interpreter.resolve` as it goes.
pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    reporter: &'a dyn ErrorReporter,
    scopes: Vec<IndexMap<String, VarState>>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
}

pub fn resolve(interpreter: &mut Interpreter, statements: &[Stmt], reporter: &dyn ErrorReporter) {
    let mut resolver = Resolver::new(interpreter, reporter);
    resolver.resolve_statements(statements);
}

/// Resolves a single bare expression, for the REPL's allow-expression mode
/// (`spec.md` §4.2/§6). A top-level expression never nests inside a pushed
/// scope, so this mostly exists for uniformity with the statement pipeline.
pub fn resolve_expression(interpreter: &mut Interpreter, expr: &Expr, reporter: &dyn ErrorReporter) {
    let mut resolver = Resolver::new(interpreter, reporter);
    resolver.resolve_expr(expr);
}

impl<'a> Resolver<'a> {
    fn new(interpreter: &'a mut Interpreter, reporter: &'a dyn ErrorReporter) -> Self {
        Self { interpreter, reporter, scopes: Vec::new(), current_function: FunctionType::None, current_class: ClassType::None, loop_depth: 0 }
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }
            Stmt::Break { keyword } => {
                if self.loop_depth == 0 {
                    self.reporter.error_token(keyword, "Can't break outside of a loop.");
                }
            }
            Stmt::Class { name, methods, class_methods, getters } => {
                self.resolve_class(name, methods, class_methods, getters);
            }
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Function(declaration) => {
                self.declare(&declaration.name);
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function);
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.reporter.error_token(keyword, "Can't return from top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.reporter.error_token(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(name);
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.loop_depth += 1;
                self.resolve_stmt(body);
                self.loop_depth -= 1;
            }
        }
    }

    fn resolve_class(&mut self, name: &Token, methods: &[std::rc::Rc<FunctionDecl>], class_methods: &[std::rc::Rc<FunctionDecl>], getters: &[std::rc::Rc<FunctionDecl>]) {
        self.declare(name);
        self.define(name);

        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.begin_this_scope();
        for method in methods {
            let function_type = if method.name.lexeme == "init" { FunctionType::Initializer } else { FunctionType::Method };
            self.resolve_function(method, function_type);
        }
        for getter in getters {
            self.resolve_function(getter, FunctionType::Method);
        }
        self.end_scope();

        // Class methods resolve inside their own `this` scope — at runtime
        // `this` there is bound to the class value via its metaclass
        // (`spec.md` §4.6), but lexically it's an ordinary synthetic binding
        // just like an instance method's.
        self.begin_this_scope();
        for class_method in class_methods {
            self.resolve_function(class_method, FunctionType::Method);
        }
        self.end_scope();

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, declaration: &FunctionDecl, function_type: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = function_type;
        let enclosing_loop_depth = self.loop_depth;
        self.loop_depth = 0;

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_statements(&declaration.body);
        self.end_scope();

        self.loop_depth = enclosing_loop_depth;
        self.current_function = enclosing_function;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Conditional { condition, then_branch, else_branch, .. } => {
                self.resolve_expr(condition);
                self.resolve_expr(then_branch);
                self.resolve_expr(else_branch);
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Grouping { inner, .. } => self.resolve_expr(inner),
            Expr::Literal { .. } => {}
            Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }
            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.reporter.error_token(keyword, "Can't use 'this' outside of a class.");
                } else {
                    self.resolve_local(*id, keyword);
                }
            }
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if let Some(state) = scope.get(&name.lexeme) {
                        if !state.defined {
                            self.reporter.error_token(name, "Can't read local variable in its own initializer.");
                        }
                    }
                }
                self.resolve_local(*id, name);
            }
        }
    }

    fn resolve_local(&mut self, id: NodeId, name: &Token) {
        let found = self.scopes.iter().rposition(|scope| scope.contains_key(&name.lexeme));
        if let Some(index) = found {
            let depth = self.scopes.len() - 1 - index;
            self.interpreter.resolve(id, depth);
            if let Some(state) = self.scopes[index].get_mut(&name.lexeme) {
                state.used = true;
            }
        }
        // No scope claims this name: it's a global, resolved by fallback at
        // evaluation time (`spec.md` §4.8) — no side-table entry needed.
    }

    fn begin_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    /// A scope pre-seeded with a non-reportable synthetic `this` (class
    /// bodies, `spec.md` §4.3).
    fn begin_this_scope(&mut self) {
        self.begin_scope();
        let this_token = Token::new(crate::token::TokenKind::This, "this", crate::token::Literal::None, 0);
        self.scopes.last_mut().expect("just pushed").insert(
            "this".to_owned(),
            VarState { token: this_token, defined: true, used: true, synthetic: true },
        );
    }

    fn end_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            for (name, state) in scope {
                if !state.used && !state.synthetic {
                    self.reporter.error_token(&state.token, &format!("Unused local variable '{name}'."));
                }
            }
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        if scope.contains_key(&name.lexeme) {
            self.reporter.error_token(name, "Already a variable with this name in this scope.");
        }
        scope.insert(name.lexeme.clone(), VarState { token: name.clone(), defined: false, used: false, synthetic: false });
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if let Some(state) = scope.get_mut(&name.lexeme) {
                state.defined = true;
            }
        }
    }
}
