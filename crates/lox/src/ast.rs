//! Abstract syntax tree.
//!
//! `spec.md` §3 calls for AST nodes with *stable identity* so the resolver's
//! `expr -> depth` side table can key on node identity rather than structural
//! equality (two syntactically identical `x` variable references at
//! different call sites must resolve to different depths). Rather than a
//! visitor hierarchy over boxed trait objects (the `loxothon` source's
//! `accept`/`Visitor` dance — `expr.py`/`stmt.py`), each `Expr` carries a
//! `NodeId` assigned once at construction (§9 Design Notes) and evaluation
//! dispatches with a plain `match`, which is the idiomatic Rust shape for a
//! closed, fixed set of tagged variants.

use std::cell::Cell;
use std::rc::Rc;

use crate::token::Token;

/// Identity key for the resolver's depth table. Monotonic and unique for the
/// lifetime of the process, so node ids stay distinct across independent
/// `parse()` calls in the same REPL session.
pub type NodeId = u32;

thread_local! {
    static NEXT_NODE_ID: Cell<NodeId> = const { Cell::new(0) };
}

fn fresh_node_id() -> NodeId {
    NEXT_NODE_ID.with(|cell| {
        let id = cell.get();
        cell.set(id.wrapping_add(1));
        id
    })
}

/// The value carried by a `Literal` expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Assign { id: NodeId, name: Token, value: Box<Expr> },
    Binary { id: NodeId, left: Box<Expr>, operator: Token, right: Box<Expr> },
    Call { id: NodeId, callee: Box<Expr>, paren: Token, args: Vec<Expr> },
    Conditional { id: NodeId, condition: Box<Expr>, then_branch: Box<Expr>, else_branch: Box<Expr> },
    Get { id: NodeId, object: Box<Expr>, name: Token },
    Grouping { id: NodeId, inner: Box<Expr> },
    Literal { id: NodeId, value: LiteralValue },
    Logical { id: NodeId, left: Box<Expr>, operator: Token, right: Box<Expr> },
    Set { id: NodeId, object: Box<Expr>, name: Token, value: Box<Expr> },
    This { id: NodeId, keyword: Token },
    Unary { id: NodeId, operator: Token, right: Box<Expr> },
    Variable { id: NodeId, name: Token },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Assign { id, .. }
            | Self::Binary { id, .. }
            | Self::Call { id, .. }
            | Self::Conditional { id, .. }
            | Self::Get { id, .. }
            | Self::Grouping { id, .. }
            | Self::Literal { id, .. }
            | Self::Logical { id, .. }
            | Self::Set { id, .. }
            | Self::This { id, .. }
            | Self::Unary { id, .. }
            | Self::Variable { id, .. } => *id,
        }
    }

    pub fn assign(name: Token, value: Expr) -> Self {
        Self::Assign { id: fresh_node_id(), name, value: Box::new(value) }
    }

    pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
        Self::Binary { id: fresh_node_id(), left: Box::new(left), operator, right: Box::new(right) }
    }

    pub fn call(callee: Expr, paren: Token, args: Vec<Expr>) -> Self {
        Self::Call { id: fresh_node_id(), callee: Box::new(callee), paren, args }
    }

    pub fn conditional(condition: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Self::Conditional {
            id: fresh_node_id(),
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    pub fn get(object: Expr, name: Token) -> Self {
        Self::Get { id: fresh_node_id(), object: Box::new(object), name }
    }

    pub fn grouping(inner: Expr) -> Self {
        Self::Grouping { id: fresh_node_id(), inner: Box::new(inner) }
    }

    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal { id: fresh_node_id(), value }
    }

    pub fn logical(left: Expr, operator: Token, right: Expr) -> Self {
        Self::Logical { id: fresh_node_id(), left: Box::new(left), operator, right: Box::new(right) }
    }

    pub fn set(object: Expr, name: Token, value: Expr) -> Self {
        Self::Set { id: fresh_node_id(), object: Box::new(object), name, value: Box::new(value) }
    }

    pub fn this(keyword: Token) -> Self {
        Self::This { id: fresh_node_id(), keyword }
    }

    pub fn unary(operator: Token, right: Expr) -> Self {
        Self::Unary { id: fresh_node_id(), operator, right: Box::new(right) }
    }

    pub fn variable(name: Token) -> Self {
        Self::Variable { id: fresh_node_id(), name }
    }
}

/// A `fun`/method declaration: name, parameter list, body, and the
/// getter/setter flags from `spec.md` §3. Shared via `Rc` because a single
/// declaration is reused by every bound method produced from it
/// (`spec.md` §4.6 — `bind` creates a fresh `Function` per call but all of
/// them point at the same `FunctionDecl`).
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub is_getter: bool,
    pub is_setter: bool,
}

#[derive(Debug)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Break { keyword: Token },
    Class {
        name: Token,
        methods: Vec<Rc<FunctionDecl>>,
        class_methods: Vec<Rc<FunctionDecl>>,
        getters: Vec<Rc<FunctionDecl>>,
    },
    Expression(Expr),
    Function(Rc<FunctionDecl>),
    If { condition: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
    Print(Expr),
    Return { keyword: Token, value: Option<Expr> },
    Var { name: Token, initializer: Option<Expr> },
    While { condition: Expr, body: Box<Stmt> },
}
