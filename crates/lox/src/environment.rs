//! Lexical scope chain.
//!
//! The direct analogue of the teacher's `Namespace`/`Namespaces` (compare
//! `ouros::namespace`), simplified from slot-indexed arrays back to
//! name-keyed maps because `spec.md` §4.4 specifies `Environment` as a
//! name->value map with an `enclosing` pointer, not a flat slot array (the
//! teacher's bytecode compiler assigns slots at compile time; this is a
//! tree-walker, so names are looked up by name at the recorded depth
//! instead). Environments are reference-counted so a closure can outlive the
//! block that created it (`spec.md` §3 Lifecycles).

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::error::{RunResult, RuntimeError};
use crate::token::Token;
use crate::value::Value;

struct EnvironmentData {
    values: AHashMap<String, Value>,
    enclosing: Option<Environment>,
}

/// A single lexical scope, cheaply cloneable (it's a handle to shared
/// storage). `Function::closure` and every `Instance`'s bound methods hold a
/// clone of one of these; cycles between an instance and a bound method that
/// closes over it are expected and tolerated (`spec.md` §9 Design Notes).
#[derive(Clone)]
pub struct Environment(Rc<RefCell<EnvironmentData>>);

impl Environment {
    /// Creates the root (global) environment.
    pub fn new_global() -> Self {
        Self(Rc::new(RefCell::new(EnvironmentData { values: AHashMap::new(), enclosing: None })))
    }

    /// Creates a new scope enclosing `self`, e.g. for a block or a call frame.
    pub fn child(&self) -> Self {
        Self(Rc::new(RefCell::new(EnvironmentData { values: AHashMap::new(), enclosing: Some(self.clone()) })))
    }

    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().values.insert(name.to_owned(), value);
    }

    /// Walks exactly `distance` `enclosing` links.
    fn ancestor(&self, distance: usize) -> Environment {
        let mut env = self.clone();
        for _ in 0..distance {
            let next = env.0.borrow().enclosing.clone().expect("ancestor distance exceeds scope chain");
            env = next;
        }
        env
    }

    /// Looks up `name` starting at the current scope and ascending through
    /// enclosing scopes. Used for the globals fallback path (`spec.md` §4.8):
    /// the evaluator only calls this on the root environment, where ascent is
    /// moot, but the ascending behavior is kept general per §4.4.
    pub fn get(&self, name: &Token) -> RunResult<Value> {
        if let Some(value) = self.0.borrow().values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        let enclosing = self.0.borrow().enclosing.clone();
        if let Some(enclosing) = enclosing {
            return enclosing.get(name);
        }
        Err(RuntimeError::new(name.clone(), format!("Undefined variable '{}'.", name.lexeme)))
    }

    pub fn assign(&self, name: &Token, value: Value) -> RunResult<()> {
        if self.0.borrow().values.contains_key(&name.lexeme) {
            self.0.borrow_mut().values.insert(name.lexeme.clone(), value);
            return Ok(());
        }
        let enclosing = self.0.borrow().enclosing.clone();
        if let Some(enclosing) = enclosing {
            return enclosing.assign(name, value);
        }
        Err(RuntimeError::new(name.clone(), format!("Undefined variable '{}'.", name.lexeme)))
    }

    /// Direct access via a resolver-computed depth. Never misses for any
    /// expression the resolver annotated — a miss here is an interpreter bug,
    /// not a user-facing error (`spec.md` §4.4 invariant), so it panics
    /// rather than returning a `Result`.
    pub fn get_at(&self, distance: usize, name: &str) -> Value {
        self.ancestor(distance)
            .0
            .borrow()
            .values
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("resolver depth invariant violated: '{name}' not found at distance {distance}"))
    }

    pub fn assign_at(&self, distance: usize, name: &Token, value: Value) {
        self.ancestor(distance).0.borrow_mut().values.insert(name.lexeme.clone(), value);
    }
}
