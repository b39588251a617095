//! # Lexically Scoped Environment
//!
//! The environment maps identifier names to type terms and provides the
//! scope discipline the checker relies on:
//!
//! - lookups walk from the innermost frame outward, so inner scopes
//!   shadow outer ones
//! - bindings always land in the innermost frame
//! - every construct that introduces bindings (functions, `let`, match
//!   cases, interface and impl blocks, generic seeding for a call)
//!   brackets its work with [`Environment::enter`] / [`Environment::leave`]
//!
//! ## Exporting bindings
//!
//! Interface and implementation blocks check their members in an inner
//! scope and then publish those members outward (that is how a method
//! declared inside `interface Show<T>` becomes callable at top level).
//! [`Environment::exit_frame`] pops the innermost frame and hands its
//! bindings back so the caller can re-insert them wherever they belong.
//!
//! ## The global frame
//!
//! [`Environment::global`] seeds the outermost frame with the primitive
//! types (`int`, `float`, `string`, `void`, `bool`), the parameterized
//! `list` data type, the `true`/`false` identifiers, and the `print`
//! builtin.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::ty::{BasicType, EnumType, Type, TypeFunction};

type Frame = HashMap<String, Type>;

/// Hierarchical name-to-type scope.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an empty environment with a single (outermost) frame.
    pub fn new() -> Self {
        Environment {
            frames: vec![Frame::new()],
        }
    }

    /// Create the initial environment for checking a program.
    pub fn global() -> Self {
        let mut env = Environment::new();
        for name in ["int", "float", "string", "void", "bool"] {
            env.set(
                name,
                Type::Basic(Rc::new(BasicType {
                    name: name.to_string(),
                })),
            );
        }

        // `list` is a parameterized data type with one type variable and
        // no user-visible constructors
        env.set(
            "list",
            Type::Enum(Rc::new(EnumType {
                name: "list".to_string(),
                generics: vec!["T".to_string()],
                constructors: RefCell::new(Vec::new()),
            })),
        );

        // The prelude binds the boolean literals as plain identifiers
        if let Some(bool_ty) = env.get("bool") {
            env.set("true", bool_ty.clone());
            env.set("false", bool_ty);
        }

        if let Some(void_ty) = env.get("void") {
            env.set(
                "print",
                Type::Function(Rc::new(TypeFunction {
                    name: RefCell::new("print".to_string()),
                    params: vec![Type::generic("T")],
                    returns: void_ty,
                    generics: vec!["T".to_string()],
                    interface: None,
                    is_virtual: false,
                })),
            );
        }

        env
    }

    /// Look up a name, walking from the innermost scope outward.
    pub fn get(&self, name: &str) -> Option<Type> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .cloned()
    }

    /// Bind (or rebind) a name in the innermost scope.
    pub fn set(&mut self, name: impl ToString, ty: Type) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), ty);
        }
    }

    /// Bind a name in the scope enclosing the innermost one. Used by
    /// function checking, which evaluates its own type in a fresh scope
    /// but must publish the function name one level up.
    pub fn set_outer(&mut self, name: impl ToString, ty: Type) {
        let index = self.frames.len().saturating_sub(2);
        if let Some(frame) = self.frames.get_mut(index) {
            frame.insert(name.to_string(), ty);
        }
    }

    /// Enter a fresh child scope.
    pub fn enter(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Leave the current scope, discarding its bindings.
    pub fn leave(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Leave the current scope and return its bindings, so the caller
    /// can export them into an outer scope.
    pub fn exit_frame(&mut self) -> Frame {
        if self.frames.len() > 1 {
            self.frames.pop().unwrap_or_default()
        } else {
            Frame::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_env() {
        let env = Environment::new();
        assert!(env.get("x").is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut env = Environment::new();
        env.set("x", Type::basic("int"));
        assert_eq!(env.get("x").map(|t| t.to_string()), Some("int".into()));
    }

    #[test]
    fn test_inner_shadows_outer() {
        let mut env = Environment::new();
        env.set("x", Type::basic("int"));
        env.enter();
        env.set("x", Type::basic("string"));
        assert_eq!(env.get("x").map(|t| t.to_string()), Some("string".into()));
        env.leave();
        assert_eq!(env.get("x").map(|t| t.to_string()), Some("int".into()));
    }

    #[test]
    fn test_parent_lookup() {
        let mut env = Environment::new();
        env.set("x", Type::basic("int"));
        env.enter();
        assert!(env.get("x").is_some());
    }

    #[test]
    fn test_leave_discards_bindings() {
        let mut env = Environment::new();
        env.enter();
        env.set("x", Type::basic("int"));
        env.leave();
        assert!(env.get("x").is_none());
    }

    #[test]
    fn test_set_outer() {
        let mut env = Environment::new();
        env.enter();
        env.set_outer("f", Type::basic("int"));
        env.leave();
        assert!(env.get("f").is_some());
    }

    #[test]
    fn test_exit_frame_returns_bindings() {
        let mut env = Environment::new();
        env.enter();
        env.set("a", Type::basic("int"));
        env.set("b", Type::basic("string"));
        let frame = env.exit_frame();
        assert_eq!(frame.len(), 2);
        assert!(env.get("a").is_none());
        for (name, ty) in frame {
            env.set(name, ty);
        }
        assert!(env.get("a").is_some());
        assert!(env.get("b").is_some());
    }

    #[test]
    fn test_global_primitives() {
        let env = Environment::global();
        for name in ["int", "float", "string", "void", "bool", "list"] {
            assert!(env.get(name).is_some(), "missing primitive {name}");
        }
        assert!(matches!(env.get("true"), Some(Type::Basic(_))));
        assert!(matches!(env.get("print"), Some(Type::Function(_))));
    }
}
