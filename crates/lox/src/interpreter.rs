//! The tree-walking evaluator.
//!
//! The analogue of `ouros`'s bytecode VM loop, but walking the AST directly
//! instead of dispatching on opcodes — there is no compile step to produce
//! opcodes from (`spec.md` Non-goals: no bytecode compilation). `locals`
//! plays the same role as the teacher's compiled slot table: a side table
//! computed once (here, by the resolver) and consulted on every variable
//! access so the interpreter never has to search the scope chain for a
//! resolved reference (`spec.md` §4.5).

use std::rc::Rc;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::ast::{Expr, FunctionDecl, LiteralValue, NodeId, Stmt};
use crate::class::Class;
use crate::environment::Environment;
use crate::error::{ErrorReporter, RunResult, RuntimeError};
use crate::function::Function;
use crate::native;
use crate::printer::{Printer, StdoutPrinter};
use crate::resource::RecursionGuard;
use crate::token::{Token, TokenKind};
use crate::value::{expect_numbers, stringify, Callable, Value};

/// How a statement finished, propagated through `Result` rather than a host
/// unwind (`spec.md` §9: "a result-carrying early-exit enum propagated by
/// every evaluator method" is an explicitly sanctioned alternative to
/// exceptions for `return`/`break`).
pub enum ControlFlow {
    Normal,
    Break,
    Return(Value),
}

/// Evaluator state: the root scope, the current scope, the resolver's depth
/// table, and the recursion budget (`spec.md` §4.5).
pub struct Interpreter {
    pub globals: Environment,
    environment: Environment,
    locals: AHashMap<NodeId, usize>,
    pub(crate) recursion: RecursionGuard,
    printer: Box<dyn Printer>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_printer(Box::new(StdoutPrinter))
    }

    /// Builds an interpreter with `print` routed to a custom sink — tests
    /// use `CollectingPrinter` so output can be asserted on directly
    /// (`spec.md` §6 treats the concrete destination as a driver concern).
    pub fn with_printer(printer: Box<dyn Printer>) -> Self {
        Self::with_printer_and_max_depth(printer, crate::resource::DEFAULT_MAX_CALL_DEPTH)
    }

    /// As [`Self::with_printer`], but with the call-depth ceiling
    /// configurable — backs the CLI's `--max-depth` flag (`SPEC_FULL.md`
    /// ambient-stack section).
    pub fn with_printer_and_max_depth(printer: Box<dyn Printer>, max_depth: usize) -> Self {
        let globals = Environment::new_global();
        globals.define("clock", Value::Native(Rc::new(native::clock())));
        Self { environment: globals.clone(), globals, locals: AHashMap::new(), recursion: RecursionGuard::new(max_depth), printer }
    }

    /// Called by the resolver for every expression it resolves to a lexical
    /// scope, populating the side table the evaluator reads from
    /// (`spec.md` §4.3/§4.5).
    pub fn resolve(&mut self, id: NodeId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Runs a parsed program, reporting the first runtime error (if any) and
    /// stopping there — subsequent REPL inputs are unaffected (`spec.md` §7).
    pub fn interpret(&mut self, statements: &[Stmt], reporter: &dyn ErrorReporter) {
        for statement in statements {
            if let Err(error) = self.execute(statement) {
                reporter.runtime_error(&error);
                return;
            }
        }
    }

    /// REPL bare-expression mode (`spec.md` §6): evaluate without the
    /// `Expression` statement wrapper so the driver can stringify and print
    /// `"= <value>"` itself.
    pub fn interpret_expression(&mut self, expr: &Expr) -> RunResult<Value> {
        self.evaluate(expr)
    }

    fn execute(&mut self, stmt: &Stmt) -> RunResult<ControlFlow> {
        match stmt {
            Stmt::Block(statements) => {
                let scope = self.environment.child();
                self.execute_block(statements, scope)
            }
            Stmt::Break { .. } => Ok(ControlFlow::Break),
            Stmt::Class { name, methods, class_methods, getters } => {
                self.execute_class(name, methods, class_methods, getters)
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(ControlFlow::Normal)
            }
            Stmt::Function(declaration) => {
                let function = Function::new(Rc::clone(declaration), self.environment.clone(), false);
                self.environment.define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
                Ok(ControlFlow::Normal)
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.printer.print(&stringify(&value));
                Ok(ControlFlow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(ControlFlow::Return(value))
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
                Ok(ControlFlow::Normal)
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        ControlFlow::Break => break,
                        ControlFlow::Return(value) => return Ok(ControlFlow::Return(value)),
                        ControlFlow::Normal => {}
                    }
                }
                Ok(ControlFlow::Normal)
            }
        }
    }

    /// Swaps in `environment` for the duration of `statements`, always
    /// restoring the previous one afterward — the one piece of resource
    /// discipline `spec.md` §5 calls out explicitly ("must restore the prior
    /// one on all exit paths").
    pub(crate) fn execute_block(&mut self, statements: &[Stmt], environment: Environment) -> RunResult<ControlFlow> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.execute_statements(statements);
        self.environment = previous;
        result
    }

    fn execute_statements(&mut self, statements: &[Stmt]) -> RunResult<ControlFlow> {
        for statement in statements {
            match self.execute(statement)? {
                ControlFlow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn execute_class(
        &mut self,
        name: &Token,
        methods: &[Rc<FunctionDecl>],
        class_methods: &[Rc<FunctionDecl>],
        getters: &[Rc<FunctionDecl>],
    ) -> RunResult<ControlFlow> {
        let class_methods_map: AHashMap<String, Rc<Function>> = class_methods
            .iter()
            .map(|decl| {
                let function = Function::new(Rc::clone(decl), self.environment.clone(), false);
                (decl.name.lexeme.clone(), Rc::new(function))
            })
            .collect();
        let metaclass = Rc::new(Class::new(format!("{} metaclass", name.lexeme), class_methods_map, AHashMap::new(), None));

        let methods_map: AHashMap<String, Rc<Function>> = methods
            .iter()
            .map(|decl| {
                let is_initializer = decl.name.lexeme == "init";
                let function = Function::new(Rc::clone(decl), self.environment.clone(), is_initializer);
                (decl.name.lexeme.clone(), Rc::new(function))
            })
            .collect();
        let getters_map: AHashMap<String, Rc<Function>> = getters
            .iter()
            .map(|decl| {
                let function = Function::new(Rc::clone(decl), self.environment.clone(), false);
                (decl.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = Rc::new(Class::new(name.lexeme.clone(), methods_map, getters_map, Some(metaclass)));
        self.environment.define(&name.lexeme, Value::Class(class));
        Ok(ControlFlow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr) -> RunResult<Value> {
        match expr {
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                if let Some(&distance) = self.locals.get(id) {
                    self.environment.assign_at(distance, name, value.clone());
                } else {
                    self.globals.assign(name, value.clone())?;
                }
                Ok(value)
            }
            Expr::Binary { left, operator, right, .. } => self.evaluate_binary(left, operator, right),
            Expr::Call { callee, paren, args, .. } => self.evaluate_call(callee, paren, args),
            Expr::Conditional { condition, then_branch, else_branch, .. } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
            Expr::Get { object, name, .. } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => instance.get(name, self),
                    Value::Class(class) => class.get(name, self),
                    _ => Err(RuntimeError::new(name.clone(), "Only instances have properties.")),
                }
            }
            Expr::Grouping { inner, .. } => self.evaluate(inner),
            Expr::Literal { value, .. } => Ok(literal_value(value)),
            Expr::Logical { left, operator, right, .. } => {
                let left_value = self.evaluate(left)?;
                match operator.kind {
                    TokenKind::Or if left_value.is_truthy() => Ok(left_value),
                    TokenKind::And if !left_value.is_truthy() => Ok(left_value),
                    _ => self.evaluate(right),
                }
            }
            Expr::Set { object, name, value, .. } => {
                let object = self.evaluate(object)?;
                let value = self.evaluate(value)?;
                match object {
                    Value::Instance(instance) => {
                        instance.set(name, value.clone());
                        Ok(value)
                    }
                    _ => Err(RuntimeError::new(name.clone(), "Only instances have fields.")),
                }
            }
            Expr::This { id, keyword } => self.lookup_variable(*id, keyword),
            Expr::Unary { operator, right, .. } => self.evaluate_unary(operator, right),
            Expr::Variable { id, name } => self.lookup_variable(*id, name),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> RunResult<Value> {
        let left_value = self.evaluate(left)?;
        // The comma operator discards its left operand without evaluating
        // the right one any differently, per `spec.md` §4.5 ("returns the
        // right operand") — still left-to-right, just no type checking.
        if operator.kind == TokenKind::Comma {
            return self.evaluate(right);
        }
        let right_value = self.evaluate(right)?;
        match operator.kind {
            TokenKind::Plus => match (&left_value, &right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
                _ => Err(RuntimeError::new(operator.clone(), "Operands must be two numbers or two strings.")),
            },
            TokenKind::Minus => {
                let (a, b) = expect_numbers(operator, &left_value, &right_value, "Operands must be numbers.")?;
                Ok(Value::Number(a - b))
            }
            TokenKind::Star => {
                let (a, b) = expect_numbers(operator, &left_value, &right_value, "Operands must be numbers.")?;
                Ok(Value::Number(a * b))
            }
            TokenKind::Slash => {
                let (a, b) = expect_numbers(operator, &left_value, &right_value, "Operands must be numbers.")?;
                // Division by zero yields NaN regardless of the numerator,
                // never a runtime error (`spec.md` §4.5) — Rust's `a / 0.0`
                // gives signed infinity for a nonzero `a`, so the zero
                // divisor has to be special-cased.
                Ok(Value::Number(if b == 0.0 { f64::NAN } else { a / b }))
            }
            TokenKind::Greater => {
                let (a, b) = expect_numbers(operator, &left_value, &right_value, "Operands must be numbers.")?;
                Ok(Value::Boolean(a > b))
            }
            TokenKind::GreaterEqual => {
                let (a, b) = expect_numbers(operator, &left_value, &right_value, "Operands must be numbers.")?;
                Ok(Value::Boolean(a >= b))
            }
            TokenKind::Less => {
                let (a, b) = expect_numbers(operator, &left_value, &right_value, "Operands must be numbers.")?;
                Ok(Value::Boolean(a < b))
            }
            TokenKind::LessEqual => {
                let (a, b) = expect_numbers(operator, &left_value, &right_value, "Operands must be numbers.")?;
                Ok(Value::Boolean(a <= b))
            }
            TokenKind::BangEqual => Ok(Value::Boolean(!left_value.lox_eq(&right_value))),
            TokenKind::EqualEqual => Ok(Value::Boolean(left_value.lox_eq(&right_value))),
            _ => unreachable!("parser never produces a Binary node with operator {:?}", operator.kind),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> RunResult<Value> {
        let right_value = self.evaluate(right)?;
        match operator.kind {
            TokenKind::Minus => match right_value {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(operator.clone(), "Operand must be a number.")),
            },
            TokenKind::Bang => Ok(Value::Boolean(!right_value.is_truthy())),
            _ => unreachable!("parser never produces a Unary node with operator {:?}", operator.kind),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, args: &[Expr]) -> RunResult<Value> {
        let callee_value = self.evaluate(callee)?;
        let mut arguments: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.evaluate(arg)?);
        }

        let callable = callee_value
            .as_callable()
            .ok_or_else(|| RuntimeError::new(paren.clone(), "Can only call functions and classes."))?;
        if arguments.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren.clone(),
                format!("Expected {} arguments but got {}.", callable.arity(), arguments.len()),
            ));
        }

        self.recursion.enter(paren)?;
        let result = callable.call(self, arguments.into_vec());
        self.recursion.leave();
        result
    }

    fn lookup_variable(&self, id: NodeId, name: &Token) -> RunResult<Value> {
        if let Some(&distance) = self.locals.get(&id) {
            Ok(self.environment.get_at(distance, &name.lexeme))
        } else {
            self.globals.get(name)
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::string(s.clone()),
        LiteralValue::Bool(b) => Value::Boolean(*b),
        LiteralValue::Nil => Value::Nil,
    }
}
