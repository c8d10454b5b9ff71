//! Classes and instances.
//!
//! The tree-walking analogue of `ouros::types::class`, scaled down to single
//! dispatch with no inheritance (`spec.md` Non-goals). A `Class` is callable
//! (invoking it constructs an `Instance`) and doubles as the namespace that
//! resolves `this` for its `class`-prefixed methods via an optional
//! `metaclass` (`spec.md` §3/§4.6) — the Rust analogue of `loxothon`'s
//! `LoxClass(LoxInstance, LoxCallable)`.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::error::{RunResult, RuntimeError};
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::{Callable, Value};

pub struct Class {
    pub name: String,
    pub methods: AHashMap<String, Rc<Function>>,
    pub getters: AHashMap<String, Rc<Function>>,
    /// The class's own class, holding its `class`-prefixed methods. Used to
    /// resolve `this` when a class method (not an instance method) runs.
    pub metaclass: Option<Rc<Class>>,
}

impl Class {
    pub fn new(
        name: String,
        methods: AHashMap<String, Rc<Function>>,
        getters: AHashMap<String, Rc<Function>>,
        metaclass: Option<Rc<Class>>,
    ) -> Self {
        Self { name, methods, getters, metaclass }
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.methods.get(name).cloned()
    }

    pub fn find_getter(&self, name: &str) -> Option<Rc<Function>> {
        self.getters.get(name).cloned()
    }

    pub fn describe(&self) -> String {
        format!("<class {}>", self.name)
    }

    /// Property access on the class value itself (e.g. `ClassName.method()`
    /// or `ClassName.GETTER`, `spec.md` §4.6): classes carry no field storage
    /// of their own, so lookup goes straight to the metaclass's methods and
    /// getters, bound with `this` set to the class.
    pub fn get(self: &Rc<Self>, name: &Token, interpreter: &mut Interpreter) -> RunResult<Value> {
        if let Some(metaclass) = &self.metaclass {
            if let Some(method) = metaclass.find_method(&name.lexeme) {
                return Ok(Value::Function(Rc::new(method.bind(Value::Class(Rc::clone(self))))));
            }
            if let Some(getter) = metaclass.find_getter(&name.lexeme) {
                return getter.bind(Value::Class(Rc::clone(self))).call(interpreter, Vec::new());
            }
        }
        Err(RuntimeError::new(name.clone(), format!("Undefined property '{}'.", name.lexeme)))
    }
}

/// `Callable` is implemented for `Rc<Class>` rather than bare `Class`
/// because constructing an instance needs a strong handle to the class to
/// stash on it (`Instance::class`); only the `Rc` gives us that from inside
/// `&self`.
impl Callable for Rc<Class> {
    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> RunResult<Value> {
        let instance = Rc::new(Instance { class: Rc::clone(self), fields: RefCell::new(AHashMap::new()) });
        if let Some(initializer) = self.find_method("init") {
            initializer.bind(Value::Instance(Rc::clone(&instance))).call(interpreter, args)?;
        }
        Ok(Value::Instance(instance))
    }

    fn describe(&self) -> String {
        Class::describe(self)
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    pub fields: RefCell<AHashMap<String, Value>>,
}

impl Instance {
    /// Field access precedence: field, then method (bound to `self`), then
    /// getter (bound and invoked), else a runtime error (`spec.md` §3/§4.6).
    pub fn get(self: &Rc<Self>, name: &Token, interpreter: &mut Interpreter) -> RunResult<Value> {
        if let Some(value) = self.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(method) = self.class.find_method(&name.lexeme) {
            return Ok(Value::Function(Rc::new(method.bind(Value::Instance(Rc::clone(self))))));
        }
        if let Some(getter) = self.class.find_getter(&name.lexeme) {
            return getter.bind(Value::Instance(Rc::clone(self))).call(interpreter, Vec::new());
        }
        Err(RuntimeError::new(name.clone(), format!("Undefined property '{}'.", name.lexeme)))
    }

    pub fn set(&self, name: &Token, value: Value) {
        self.fields.borrow_mut().insert(name.lexeme.clone(), value);
    }

    pub fn describe(&self) -> String {
        format!("<instance {}>", self.class.name)
    }
}
