//! User-defined functions, closures, and native bindings.
//!
//! The tree-walking analogue of `ouros::function::Function`: the teacher's
//! `Function` captures compiled bytecode plus a slot layout for closed-over
//! variables; this one captures the declaration's AST plus the `Environment`
//! it closed over directly, since there is no separate compile step
//! (`spec.md` Non-goals: no bytecode compilation). `bind` mirrors the
//! teacher's "new environment per bind, same declaration" shape.

use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::RunResult;
use crate::interpreter::{ControlFlow, Interpreter};
use crate::value::{Callable, Value};

/// A function value: a declaration plus the environment it closed over.
///
/// `is_initializer` marks a class's `init` method — such a function always
/// returns `this` regardless of how its body exits (`spec.md` §4.5/§4.6).
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Environment,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Environment, is_initializer: bool) -> Self {
        Self { declaration, closure, is_initializer }
    }

    /// Produces a new bound method each call — identity is not cached
    /// (`spec.md` §4.6). `this_value` is whatever `this` should resolve to
    /// inside the body: an `Instance` for ordinary methods and getters, or a
    /// `Class` itself for `class`-prefixed methods dispatched through a
    /// metaclass (`spec.md` §4.6).
    pub fn bind(&self, this_value: Value) -> Function {
        let environment = self.closure.child();
        environment.define("this", this_value);
        Function::new(Rc::clone(&self.declaration), environment, self.is_initializer)
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> RunResult<Value> {
        let environment = self.closure.child();
        for (param, argument) in self.declaration.params.iter().zip(args) {
            environment.define(&param.lexeme, argument);
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment)?;
        if self.is_initializer {
            return Ok(self.closure.get_at(0, "this"));
        }
        match flow {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Normal | ControlFlow::Break => Ok(Value::Nil),
        }
    }

    fn describe(&self) -> String {
        format!("<fun {}>", self.declaration.name.lexeme)
    }
}

/// A host-provided function exposed to Lox code, e.g. `clock` (`spec.md`
/// §4.5/§6).
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    func: Box<dyn Fn(&mut Interpreter, Vec<Value>) -> RunResult<Value>>,
}

impl NativeFunction {
    pub fn new(
        name: &'static str,
        arity: usize,
        func: impl Fn(&mut Interpreter, Vec<Value>) -> RunResult<Value> + 'static,
    ) -> Self {
        Self { name, arity, func: Box::new(func) }
    }
}

impl NativeFunction {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> RunResult<Value> {
        (self.func)(interpreter, args)
    }

    fn describe(&self) -> String {
        "<native fun>".to_owned()
    }
}
