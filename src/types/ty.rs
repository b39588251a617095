//! # Type Terms
//!
//! This module defines the value objects the type checker manipulates:
//! basic types, unresolved generics, function types, enums and their
//! constructors, concrete data-type instances, interfaces, and interface
//! implementations.
//!
//! ## Overview
//!
//! Types are compared with [`Type::accepts`], a subtype-like
//! assignability predicate:
//!
//! - `int` accepts `int` (same name)
//! - an unresolved generic accepts anything (resolution is recorded in
//!   the environment, see [`crate::types::unify`])
//! - function types are structural: same arity, pairwise-accepting
//!   parameters, accepting return
//! - `Maybe<int>` accepts `Maybe<int>` but not `Maybe<string>` (same
//!   enum identity, pairwise-accepting arguments)
//!
//! ## Identity and Sharing
//!
//! Type terms have reference identity. An enum declared once is a single
//! `Rc<EnumType>`; every `Maybe<...>` instance points back at it, and
//! instance compatibility checks compare those pointers. Back-edges that
//! would otherwise form ownership cycles are non-owning:
//!
//! - a constructor owns its enum (`Rc`), the enum lists its constructors
//!   weakly
//! - an interface owns its implementations, an implementation points back
//!   weakly; function types point at their owning interface weakly
//!
//! ## Related Modules
//!
//! - [`crate::types::env`] - name → type scopes
//! - [`crate::types::unify`] - generic resolution over these terms
//! - [`crate::types::check`] - the type-of pass that builds them

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::env::Environment;

/// A type term. Cheap to clone; clones share the underlying term.
#[derive(Debug, Clone)]
pub enum Type {
    Basic(Rc<BasicType>),
    Generic(Rc<GenericType>),
    Function(Rc<TypeFunction>),
    Enum(Rc<EnumType>),
    Instance(Rc<DataTypeInstance>),
    Interface(Rc<TypeInterface>),
    Constructor(Rc<TypeConstructor>),
}

/// A named primitive (`int`, `float`, `string`, `void`, `bool`, or any
/// user-declared simple name).
#[derive(Debug)]
pub struct BasicType {
    pub name: String,
}

/// A yet-unresolved generic parameter. `accepts` is always true at the
/// predicate level; resolution happens through environment bindings.
#[derive(Debug)]
pub struct GenericType {
    pub name: String,
}

/// A function type.
///
/// `interface` points back at the owning interface when the type was
/// declared inside one; call sites use it to drive dispatch mangling.
/// `name` is interior-mutable because prototypes name the term after
/// constructing it (and suffix it inside `impl` blocks).
#[derive(Debug)]
pub struct TypeFunction {
    pub name: RefCell<String>,
    pub params: Vec<Type>,
    pub returns: Type,
    pub generics: Vec<String>,
    pub interface: Option<Weak<TypeInterface>>,
    pub is_virtual: bool,
}

/// A tagged sum type. Constructors are appended while the declaration is
/// checked, tagged in declaration order.
#[derive(Debug)]
pub struct EnumType {
    pub name: String,
    pub generics: Vec<String>,
    pub constructors: RefCell<Vec<Weak<TypeConstructor>>>,
}

/// A named case of an enum. Doubles as a function from its field types
/// to the (applied) enum.
#[derive(Debug)]
pub struct TypeConstructor {
    pub name: String,
    pub tag: usize,
    pub types: Vec<Type>,
    pub generics: Vec<String>,
    pub owner: Rc<EnumType>,
}

/// A concrete application of a parameterized data type, e.g.
/// `Maybe<int>` or `list<string>`.
#[derive(Debug)]
pub struct DataTypeInstance {
    pub data_type: Type,
    pub types: Vec<Type>,
}

/// A named interface parameterized by a single type variable.
#[derive(Debug)]
pub struct TypeInterface {
    pub name: String,
    pub generic_name: String,
    pub virtuals: Vec<String>,
    pub concretes: Vec<String>,
    pub implementations: RefCell<Vec<Rc<TypeImplementation>>>,
}

/// An instance of an interface for one concrete type.
#[derive(Debug)]
pub struct TypeImplementation {
    pub interface: Weak<TypeInterface>,
    pub ty: Type,
}

impl Type {
    /// Assignability: can a value of type `other` be used where `self`
    /// is expected?
    ///
    /// Unresolved generics and interface parameters accept anything at
    /// this level; the argument checker records what they resolved to in
    /// the environment as it goes.
    pub fn accepts(&self, other: &Type, env: &Environment) -> bool {
        match (self, other) {
            (Type::Generic(_), _) => true,
            (Type::Interface(_), _) => true,
            (Type::Basic(a), Type::Basic(b)) => a.name == b.name,
            (Type::Enum(a), Type::Enum(b)) => Rc::ptr_eq(a, b),
            (Type::Instance(a), Type::Instance(b)) => {
                a.data_type.is_same(&b.data_type)
                    && a.types.len() == b.types.len()
                    && a.types
                        .iter()
                        .zip(b.types.iter())
                        .all(|(x, y)| x.accepts(y, env))
            }
            (Type::Function(a), Type::Function(b)) => {
                a.params.len() == b.params.len()
                    && a.params
                        .iter()
                        .zip(b.params.iter())
                        .all(|(x, y)| x.accepts(y, env))
                    && a.returns.accepts(&b.returns, env)
            }
            // A constructor is usable where a function is expected
            (Type::Function(a), Type::Constructor(b)) => {
                a.params.len() == b.types.len()
                    && a.params
                        .iter()
                        .zip(b.types.iter())
                        .all(|(x, y)| x.accepts(y, env))
                    && a.returns.accepts(&Type::Enum(b.owner.clone()), env)
            }
            (Type::Constructor(a), Type::Constructor(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Reference identity between the "base" of two types, used when
    /// comparing data-type instances.
    pub fn is_same(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Basic(a), Type::Basic(b)) => a.name == b.name,
            (Type::Generic(a), Type::Generic(b)) => a.name == b.name,
            (Type::Enum(a), Type::Enum(b)) => Rc::ptr_eq(a, b),
            (Type::Interface(a), Type::Interface(b)) => Rc::ptr_eq(a, b),
            (Type::Function(a), Type::Function(b)) => Rc::ptr_eq(a, b),
            (Type::Constructor(a), Type::Constructor(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Basic(b) => write!(f, "{}", b.name),
            Type::Generic(g) => write!(f, "{}", g.name),
            Type::Enum(e) => write!(f, "{}", e.name),
            Type::Interface(i) => write!(f, "{}", i.name),
            Type::Constructor(c) => write!(f, "{}", c.name),
            Type::Instance(inst) => {
                write!(f, "{}", inst.data_type)?;
                if !inst.types.is_empty() {
                    write!(f, "<")?;
                    for (i, t) in inst.types.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", t)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Function(func) => {
                write!(f, "(")?;
                for (i, p) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", func.returns)
            }
        }
    }
}

/// A callable seen by the argument checker: either a function type or a
/// constructor acting as one.
#[derive(Debug, Clone)]
pub enum FunctionKind {
    Function(Rc<TypeFunction>),
    Constructor(Rc<TypeConstructor>),
}

impl FunctionKind {
    pub fn name(&self) -> String {
        match self {
            FunctionKind::Function(f) => f.name.borrow().clone(),
            FunctionKind::Constructor(c) => c.name.clone(),
        }
    }

    pub fn param_types(&self) -> &[Type] {
        match self {
            FunctionKind::Function(f) => &f.params,
            FunctionKind::Constructor(c) => &c.types,
        }
    }

    pub fn generics(&self) -> &[String] {
        match self {
            FunctionKind::Function(f) => &f.generics,
            FunctionKind::Constructor(c) => &c.generics,
        }
    }

    pub fn return_type(&self) -> Type {
        match self {
            FunctionKind::Function(f) => f.returns.clone(),
            FunctionKind::Constructor(c) => Type::Enum(c.owner.clone()),
        }
    }
}

/// Shorthand constructors used across the checker and in tests.
impl Type {
    pub fn basic(name: impl Into<String>) -> Type {
        Type::Basic(Rc::new(BasicType { name: name.into() }))
    }

    pub fn generic(name: impl Into<String>) -> Type {
        Type::Generic(Rc::new(GenericType { name: name.into() }))
    }
}
