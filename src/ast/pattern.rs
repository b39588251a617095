//! # Constructor Patterns
//!
//! Patterns destructure enum values in `match` cases and in `let`
//! bindings:
//!
//! ```text
//! match opt {
//!     case Some(x): x
//!     case None: 0
//! }
//! ```
//!
//! A pattern names a constructor and binds one identifier per
//! constructor field. The type checker verifies the pattern against the
//! matched value's type, records the constructor's numeric `tag` on the
//! node (the generator dispatches on it), and binds each identifier in
//! the surrounding scope with the field's instantiated type.

use lachs::Span;

use super::expression::Identifier;

/// A constructor-shaped pattern: `Some(x)`, `None`.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub constructor: String,
    pub bindings: Vec<Identifier>,
    /// Constructor tag, written by the type checker for match dispatch
    pub tag: Option<usize>,
    pub position: Span,
}
