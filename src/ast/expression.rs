use lachs::Span;

use super::pattern::Pattern;
use super::{Block, Node};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone)]
pub struct Number {
    pub value: NumberValue,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct StringLit {
    pub value: String,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct List {
    pub items: Vec<Node>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Let {
    pub assignments: Vec<Assignment>,
    pub block: Block,
    pub position: Span,
}

/// Assignment left-hand side - a plain name or a destructuring pattern
#[derive(Debug, Clone)]
pub enum AssignmentTarget {
    Identifier(Identifier),
    Pattern(Pattern),
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub target: AssignmentTarget,
    pub value: Box<Node>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct If {
    pub condition: Box<Node>,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Match {
    pub subject: Box<Node>,
    pub cases: Vec<Case>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub pattern: Pattern,
    pub body: Block,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct UnaryOperation {
    pub operand: Box<Node>,
    pub position: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone)]
pub struct BinaryOperation {
    pub op: BinOp,
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub callee: Identifier,
    pub arguments: Vec<Node>,
    pub position: Span,
}

/// Constructor application. The parser emits this instead of [`Call`]
/// whenever the callee names a declared enum constructor; the checker
/// fills in `tag` and `size` (field count plus the tag slot) for codegen.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: Identifier,
    pub arguments: Vec<Node>,
    pub tag: Option<usize>,
    pub size: Option<usize>,
    pub position: Span,
}
