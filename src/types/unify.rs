use std::rc::Rc;

use super::env::Environment;
use super::ty::{DataTypeInstance, FunctionKind, Type};

/// Seed a scope with a fresh unresolved binding for each generic name.
/// Done on entry to any scope that introduces generics (function types,
/// enum declarations, call-site argument checking).
pub fn load_generics(names: &[String], env: &mut Environment) {
    for name in names {
        env.set(name, Type::generic(name.clone()));
    }
}

/// Substitute resolved generics through the scope chain.
///
/// - a generic resolves to whatever the environment bound it to (and
///   that result is simplified again), or stays itself
/// - a data-type instance is rebuilt with its base and arguments
///   simplified
/// - an interface occurrence resolves to the binding of its type
///   parameter once that binding is concrete
pub fn simplify(ty: &Type, env: &Environment) -> Type {
    match ty {
        Type::Generic(g) => match env.get(&g.name) {
            Some(Type::Generic(h)) if h.name == g.name => ty.clone(),
            Some(other) => simplify(&other, env),
            None => ty.clone(),
        },
        Type::Instance(inst) => {
            let data_type = simplify(&inst.data_type, env);
            let types = inst.types.iter().map(|t| simplify(t, env)).collect();
            Type::Instance(Rc::new(DataTypeInstance { data_type, types }))
        }
        Type::Interface(i) => match env.get(&i.generic_name) {
            Some(Type::Generic(_)) | None => ty.clone(),
            Some(Type::Interface(other)) if Rc::ptr_eq(i, &other) => ty.clone(),
            Some(other) => simplify(&other, env),
        },
        _ => ty.clone(),
    }
}

/// Assignability after resolving generics on both sides.
pub fn type_eq(expected: &Type, actual: &Type, env: &Environment) -> bool {
    simplify(expected, env).accepts(&simplify(actual, env), env)
}

/// The type a call to `fun` evaluates to in `env`.
///
/// When the return type is a parameterized enum, the call produces an
/// instance applied to whatever its generics resolved to during
/// argument checking; otherwise the declared return type, simplified.
pub fn enum_ret_type(fun: &FunctionKind, env: &Environment) -> Type {
    let returns = fun.return_type();
    if let Type::Enum(e) = &returns {
        if !e.generics.is_empty() {
            let types = e
                .generics
                .iter()
                .map(|g| env.get(g).unwrap_or_else(|| Type::generic(g.clone())))
                .collect();
            return Type::Instance(Rc::new(DataTypeInstance {
                data_type: returns.clone(),
                types,
            }));
        }
    }
    simplify(&returns, env)
}
