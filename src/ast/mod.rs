//! # Verve AST
//!
//! Tree representation of parsed Verve programs. Every node carries a
//! source `position` for diagnostics.
//!
//! ## Pipeline Position
//!
//! ```text
//! Lexer → Token Stream → Parser → [AST] → Type Checker → Bytecode Generator
//! ```
//!
//! The type checker annotates the tree in place: constructor applications
//! receive their `tag` and cell `size`, patterns receive their `tag`, and
//! call-site identifiers may be rewritten to mangled interface-dispatch
//! names (`show` → `show$int`). The bytecode generator then consumes the
//! annotated tree read-only.
//!
//! ## Module Organization
//!
//! - [`expression`] - Expressions (literals, lists, let, if, match, calls)
//! - [`declaration`] - Enums, interfaces, implementations, functions, type
//!   annotations
//! - [`pattern`] - Constructor patterns used in match cases and bindings

use lachs::Span;

pub mod declaration;
pub mod expression;
pub mod pattern;

pub use declaration::*;
pub use expression::*;
pub use pattern::*;

/// A complete Verve program: a flat sequence of top-level items.
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Block,
}

/// A brace-delimited (or top-level) sequence of nodes. A block evaluates
/// to its last node; an empty block evaluates to `void`.
#[derive(Debug, Clone)]
pub struct Block {
    pub nodes: Vec<Node>,
    pub position: Span,
}

/// Any node the type checker can assign a type to.
#[derive(Debug, Clone)]
pub enum Node {
    Number(Number),
    String(StringLit),
    Identifier(Identifier),
    List(List),
    Let(Let),
    If(If),
    Match(Match),
    UnaryOperation(UnaryOperation),
    BinaryOperation(BinaryOperation),
    Call(Call),
    Constructor(Constructor),
    Enum(EnumDecl),
    Interface(InterfaceDecl),
    Implementation(ImplementationDecl),
    Function(Function),
    Prototype(Prototype),
}

impl Node {
    /// Get the source position of this node
    pub fn position(&self) -> &Span {
        match self {
            Node::Number(n) => &n.position,
            Node::String(s) => &s.position,
            Node::Identifier(id) => &id.position,
            Node::List(l) => &l.position,
            Node::Let(l) => &l.position,
            Node::If(i) => &i.position,
            Node::Match(m) => &m.position,
            Node::UnaryOperation(u) => &u.position,
            Node::BinaryOperation(b) => &b.position,
            Node::Call(c) => &c.position,
            Node::Constructor(c) => &c.position,
            Node::Enum(e) => &e.position,
            Node::Interface(i) => &i.position,
            Node::Implementation(i) => &i.position,
            Node::Function(f) => &f.position,
            Node::Prototype(p) => &p.position,
        }
    }
}
