//! The type-of pass: one handler per AST node kind, threading a scoped
//! environment and annotating the tree for the bytecode generator.

use std::cell::RefCell;
use std::rc::Rc;

use lachs::Span;

use crate::ast::{
    Assignment, AssignmentTarget, BinaryOperation, Block, Call, Case, Constructor, EnumDecl,
    Function, FunctionTypeSpec, Identifier, If, ImplementationDecl, InterfaceDecl, Let, List,
    Match, Node, Number, NumberValue, Pattern, Program, Prototype, TypeSpec, UnaryOperation,
};

use super::env::Environment;
use super::error::TypeError;
use super::ty::{
    DataTypeInstance, EnumType, FunctionKind, Type, TypeConstructor, TypeFunction,
    TypeImplementation, TypeInterface,
};
use super::unify::{enum_ret_type, load_generics, simplify, type_eq};

/// The type checker.
///
/// The two fields carry the ambient state of the construct being
/// checked: the interface whose block we are inside (so function types
/// declared there know their owner), and the `$type` suffix applied to
/// method names while inside an `impl` block. Both are saved and
/// restored around the blocks that set them.
pub struct TypeChecker {
    interface: Option<Rc<TypeInterface>>,
    implementation_suffix: String,
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            interface: None,
            implementation_suffix: String::new(),
        }
    }

    pub fn check_program(
        &mut self,
        program: &mut Program,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        self.check_block(&mut program.body, env)
    }

    pub fn type_of(&mut self, node: &mut Node, env: &mut Environment) -> Result<Type, TypeError> {
        match node {
            Node::Number(n) => self.check_number(n, env),
            Node::String(s) => self.primitive("string", env, &s.position),
            Node::Identifier(id) => self.check_identifier(id, env),
            Node::List(l) => self.check_list(l, env),
            Node::Let(l) => self.check_let(l, env),
            Node::If(i) => self.check_if(i, env),
            Node::Match(m) => self.check_match(m, env),
            Node::UnaryOperation(u) => self.check_unary(u, env),
            Node::BinaryOperation(b) => self.check_binary(b, env),
            Node::Call(c) => self.check_call(c, env),
            Node::Constructor(c) => self.check_constructor(c, env),
            Node::Enum(e) => self.check_enum(e, env),
            Node::Interface(i) => self.check_interface(i, env),
            Node::Implementation(i) => self.check_implementation(i, env),
            Node::Function(f) => self.check_function(f, env),
            Node::Prototype(p) => self.check_prototype(p, env),
        }
    }

    fn primitive(&self, name: &str, env: &Environment, span: &Span) -> Result<Type, TypeError> {
        env.get(name)
            .ok_or_else(|| TypeError::unknown_type(name, span.clone()))
    }

    /// A block threads the surrounding scope; its type is the type of
    /// its last node, or `void` when empty.
    pub fn check_block(
        &mut self,
        block: &mut Block,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let mut last = None;
        for node in &mut block.nodes {
            last = Some(self.type_of(node, env)?);
        }
        match last {
            Some(ty) => Ok(ty),
            None => self.primitive("void", env, &block.position),
        }
    }

    fn check_number(&mut self, number: &Number, env: &Environment) -> Result<Type, TypeError> {
        match number.value {
            NumberValue::Int(_) => self.primitive("int", env, &number.position),
            NumberValue::Float(_) => self.primitive("float", env, &number.position),
        }
    }

    fn check_identifier(
        &mut self,
        ident: &Identifier,
        env: &Environment,
    ) -> Result<Type, TypeError> {
        env.get(&ident.name)
            .ok_or_else(|| TypeError::unknown_identifier(ident.name.clone(), ident.position.clone()))
    }

    fn check_list(&mut self, list: &mut List, env: &mut Environment) -> Result<Type, TypeError> {
        let mut element: Option<Type> = None;
        for item in &mut list.items {
            let ty = self.type_of(item, env)?;
            match &element {
                None => element = Some(ty),
                Some(current) => {
                    if type_eq(&ty, current, env) || type_eq(current, &ty, env) {
                        continue;
                    }
                    return Err(TypeError::mixed_list(
                        current,
                        &ty,
                        item.position().clone(),
                    ));
                }
            }
        }
        let element = element.unwrap_or_else(|| Type::generic("T"));
        let list_ty = self.primitive("list", env, &list.position)?;
        Ok(Type::Instance(Rc::new(DataTypeInstance {
            data_type: list_ty,
            types: vec![element],
        })))
    }

    fn check_let(&mut self, let_: &mut Let, env: &mut Environment) -> Result<Type, TypeError> {
        env.enter();
        let result = (|| {
            for assignment in &mut let_.assignments {
                self.check_assignment(assignment, env)?;
            }
            self.check_block(&mut let_.block, env)
        })();
        env.leave();
        result
    }

    fn check_assignment(
        &mut self,
        assignment: &mut Assignment,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let ty = self.type_of(&mut assignment.value, env)?;
        match &mut assignment.target {
            AssignmentTarget::Identifier(id) => env.set(&id.name, ty.clone()),
            AssignmentTarget::Pattern(pattern) => {
                self.check_pattern(pattern, &ty, env)?;
            }
        }
        Ok(ty)
    }

    fn check_if(&mut self, if_: &mut If, env: &mut Environment) -> Result<Type, TypeError> {
        // The condition is walked but its type is not constrained
        self.type_of(&mut if_.condition, env)?;
        let then_ty = self.check_block(&mut if_.then_block, env)?;
        match &mut if_.else_block {
            None => Ok(then_ty),
            Some(else_block) => {
                let else_ty = self.check_block(else_block, env)?;
                if type_eq(&then_ty, &else_ty, env) {
                    Ok(then_ty)
                } else if type_eq(&else_ty, &then_ty, env) {
                    Ok(else_ty)
                } else {
                    Err(TypeError::branch_mismatch(if_.position.clone()))
                }
            }
        }
    }

    fn check_match(&mut self, match_: &mut Match, env: &mut Environment) -> Result<Type, TypeError> {
        if match_.cases.is_empty() {
            return Err(TypeError::empty_match(match_.position.clone()));
        }
        let subject_ty = self.type_of(&mut match_.subject, env)?;
        let mut result: Option<Type> = None;
        for case in &mut match_.cases {
            let ty = self.check_case(case, &subject_ty, env)?;
            match &result {
                None => result = Some(ty),
                Some(current) => {
                    if type_eq(&ty, current, env) || type_eq(current, &ty, env) {
                        continue;
                    }
                    return Err(TypeError::mixed_match(current, &ty, case.position.clone()));
                }
            }
        }
        result.ok_or_else(|| TypeError::empty_match(match_.position.clone()))
    }

    fn check_case(
        &mut self,
        case: &mut Case,
        subject_ty: &Type,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        env.enter();
        let result = (|| {
            self.check_pattern(&mut case.pattern, subject_ty, env)?;
            self.check_block(&mut case.body, env)
        })();
        env.leave();
        result
    }

    /// Check a constructor pattern against the matched value's type,
    /// record the constructor tag on the node, and bind the pattern's
    /// names in the surrounding scope with their instantiated types.
    fn check_pattern(
        &mut self,
        pattern: &mut Pattern,
        value_ty: &Type,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let ctor = match env.get(&pattern.constructor) {
            Some(Type::Constructor(ctor)) => ctor,
            _ => {
                return Err(TypeError::unknown_constructor_pattern(
                    pattern.constructor.clone(),
                    pattern.position.clone(),
                ));
            }
        };
        if ctor.types.len() != pattern.bindings.len() {
            return Err(TypeError::pattern_binding_count(
                pattern.constructor.clone(),
                pattern.position.clone(),
            ));
        }

        env.enter();
        // Instantiate the constructor's generics from the value's type
        // arguments, so field types resolve to concrete types below
        if let Type::Instance(inst) = value_ty {
            for (generic, ty) in ctor.generics.iter().zip(inst.types.iter()) {
                env.set(generic, ty.clone());
            }
        }
        let returned = enum_ret_type(&FunctionKind::Constructor(ctor.clone()), env);
        if !type_eq(value_ty, &returned, env) {
            env.leave();
            return Err(TypeError::pattern_mismatch(
                value_ty,
                pattern.constructor.clone(),
                pattern.position.clone(),
            ));
        }
        pattern.tag = Some(ctor.tag);
        let bound: Vec<Type> = ctor.types.iter().map(|t| simplify(t, env)).collect();
        env.leave();

        for (binding, ty) in pattern.bindings.iter().zip(bound) {
            env.set(&binding.name, ty);
        }
        Ok(Type::Constructor(ctor))
    }

    fn check_unary(
        &mut self,
        unary: &mut UnaryOperation,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        self.type_of(&mut unary.operand, env)?;
        self.primitive("int", env, &unary.position)
    }

    fn check_binary(
        &mut self,
        binary: &mut BinaryOperation,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let int = self.primitive("int", env, &binary.position)?;
        let lhs = self.type_of(&mut binary.lhs, env)?;
        if !type_eq(&int, &lhs, env) {
            return Err(TypeError::binary_operand(
                simplify(&lhs, env),
                binary.lhs.position().clone(),
            ));
        }
        let rhs = self.type_of(&mut binary.rhs, env)?;
        if !type_eq(&int, &rhs, env) {
            return Err(TypeError::binary_operand(
                simplify(&rhs, env),
                binary.rhs.position().clone(),
            ));
        }
        Ok(int)
    }

    /// Resolve a type annotation to a type term.
    fn check_type_spec(
        &mut self,
        spec: &TypeSpec,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        match spec {
            TypeSpec::Basic(basic) => env
                .get(&basic.name)
                .ok_or_else(|| TypeError::unknown_type(basic.name.clone(), basic.position.clone())),
            TypeSpec::Data(data) => {
                let base = env
                    .get(&data.name)
                    .ok_or_else(|| TypeError::unknown_type(data.name.clone(), data.position.clone()))?;
                let types = data
                    .params
                    .iter()
                    .map(|p| self.check_type_spec(p, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Type::Instance(Rc::new(DataTypeInstance {
                    data_type: base,
                    types,
                })))
            }
            TypeSpec::Function(func) => self
                .function_type(func, env, false)
                .map(Type::Function),
        }
    }

    /// Build a function type from its annotation. Generic names are
    /// seeded into the current scope first so parameter and return
    /// annotations can refer to them.
    fn function_type(
        &mut self,
        spec: &FunctionTypeSpec,
        env: &mut Environment,
        is_virtual: bool,
    ) -> Result<Rc<TypeFunction>, TypeError> {
        load_generics(&spec.generics, env);
        let params = spec
            .params
            .iter()
            .map(|p| self.check_type_spec(p, env))
            .collect::<Result<Vec<_>, _>>()?;
        let returns = self.check_type_spec(&spec.returns, env)?;
        Ok(Rc::new(TypeFunction {
            name: RefCell::new(String::new()),
            params,
            returns,
            generics: spec.generics.clone(),
            interface: self.interface.as_ref().map(Rc::downgrade),
            is_virtual,
        }))
    }

    fn check_prototype(
        &mut self,
        proto: &mut Prototype,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        env.enter();
        let result = self.function_type(&proto.type_spec, env, proto.is_virtual);
        env.leave();
        let func = result?;
        proto.name.push_str(&self.implementation_suffix);
        *func.name.borrow_mut() = proto.name.clone();
        env.set(&proto.name, Type::Function(func.clone()));
        Ok(Type::Function(func))
    }

    fn check_function(
        &mut self,
        function: &mut Function,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        env.enter();
        let result = self.check_function_inner(function, env);
        env.leave();
        result
    }

    fn check_function_inner(
        &mut self,
        function: &mut Function,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let func = match &function.type_spec {
            Some(spec) => {
                let func = self.function_type(spec, env, false)?;
                *func.name.borrow_mut() = function.name.clone();
                func
            }
            None => match env.get(&function.name) {
                // No signature written down: pick it up from a
                // previously checked prototype of the same name
                Some(Type::Function(func)) => {
                    load_generics(&func.generics, env);
                    env.set(&function.name, Type::Function(func.clone()));
                    func
                }
                _ => {
                    return Err(TypeError::unknown_identifier(
                        function.name.clone(),
                        function.position.clone(),
                    ));
                }
            },
        };

        function.name.push_str(&self.implementation_suffix);
        if function.type_spec.is_some() {
            *func.name.borrow_mut() = function.name.clone();
        }
        env.set_outer(&function.name, Type::Function(func.clone()));

        if func.params.len() != function.parameters.len() {
            return Err(TypeError::parameter_count(
                function.name.clone(),
                function.position.clone(),
            ));
        }
        for (param, ty) in function.parameters.iter().zip(func.params.iter()) {
            env.set(&param.name, ty.clone());
        }

        let body_ty = self.check_block(&mut function.body, env)?;
        if !type_eq(&func.returns, &body_ty, env) {
            return Err(TypeError::invalid_return_type(
                simplify(&func.returns, env),
                simplify(&body_ty, env),
                function.position.clone(),
            ));
        }
        Ok(Type::Function(func))
    }

    fn check_call(&mut self, call: &mut Call, env: &mut Environment) -> Result<Type, TypeError> {
        env.enter();
        let result = self.check_call_inner(call, env);
        env.leave();
        result
    }

    fn check_call_inner(
        &mut self,
        call: &mut Call,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let callee_ty = self.check_identifier(&call.callee, env)?;
        let func = match callee_ty {
            Type::Function(func) => func,
            _ => return Err(TypeError::not_a_function(call.position.clone())),
        };
        let kind = FunctionKind::Function(func.clone());
        let result = self.check_arguments(&mut call.arguments, &kind, env, &call.position)?;

        // Interface method: rewrite the callee to the mangled name of
        // the implementation selected by the resolved type parameter,
        // if one is in scope
        if let Some(weak) = &func.interface {
            if let Some(interface) = weak.upgrade() {
                if let Some(concrete) = env.get(&interface.generic_name) {
                    let mangled = format!("{}${}", call.callee.name, concrete);
                    if env.get(&mangled).is_some() {
                        call.callee.name = mangled;
                    }
                }
            }
        }
        Ok(result)
    }

    fn check_constructor(
        &mut self,
        ctor_call: &mut Constructor,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let ctor = match env.get(&ctor_call.name.name) {
            Some(Type::Constructor(ctor)) => ctor,
            _ => {
                return Err(TypeError::undefined_constructor(
                    ctor_call.name.name.clone(),
                    ctor_call.position.clone(),
                ));
            }
        };
        env.enter();
        ctor_call.tag = Some(ctor.tag);
        ctor_call.size = Some(ctor.types.len() + 1);
        let kind = FunctionKind::Constructor(ctor);
        let result = self.check_arguments(&mut ctor_call.arguments, &kind, env, &ctor_call.position);
        env.leave();
        result
    }

    /// Check call arguments against the callable's parameters, seeding
    /// the scope with each generic resolution as it is discovered, and
    /// return the call's (instantiated) result type.
    fn check_arguments(
        &mut self,
        arguments: &mut [Node],
        fun: &FunctionKind,
        env: &mut Environment,
        loc: &Span,
    ) -> Result<Type, TypeError> {
        let params = fun.param_types().to_vec();
        if arguments.len() != params.len() {
            return Err(TypeError::wrong_argument_count(loc.clone()));
        }
        load_generics(fun.generics(), env);

        for (i, argument) in arguments.iter_mut().enumerate() {
            let actual = self.type_of(argument, env)?;
            let expected = simplify(&params[i], env);
            match &expected {
                // First sighting of an unresolved generic or interface
                // parameter: record what it resolved to and move on
                Type::Generic(g) => {
                    env.set(&g.name, actual);
                    continue;
                }
                Type::Interface(interface) => {
                    env.set(&interface.generic_name, actual);
                    continue;
                }
                _ => {}
            }
            if !expected.accepts(&simplify(&actual, env), env) {
                return Err(TypeError::argument_mismatch(
                    &expected,
                    simplify(&actual, env),
                    i + 1,
                    fun.name(),
                    argument.position().clone(),
                ));
            }
        }
        Ok(enum_ret_type(fun, env))
    }

    /// Declare an enum: bind the type, then each constructor with a
    /// sequential tag, its field types resolved in a scope where the
    /// enum's generics are in force.
    fn check_enum(&mut self, decl: &mut EnumDecl, env: &mut Environment) -> Result<Type, TypeError> {
        let enum_ty = Rc::new(EnumType {
            name: decl.name.clone(),
            generics: decl.generics.clone(),
            constructors: RefCell::new(Vec::new()),
        });
        env.set(&decl.name, Type::Enum(enum_ty.clone()));

        env.enter();
        let constructors = (|| {
            load_generics(&decl.generics, env);
            let mut constructors = Vec::new();
            for (tag, ctor) in decl.constructors.iter().enumerate() {
                let types = ctor
                    .params
                    .iter()
                    .map(|p| self.check_type_spec(p, env))
                    .collect::<Result<Vec<_>, _>>()?;
                let ctor = Rc::new(TypeConstructor {
                    name: ctor.name.clone(),
                    tag,
                    types,
                    generics: decl.generics.clone(),
                    owner: enum_ty.clone(),
                });
                enum_ty.constructors.borrow_mut().push(Rc::downgrade(&ctor));
                constructors.push(ctor);
            }
            Ok(constructors)
        })();
        env.leave();

        for ctor in constructors? {
            env.set(ctor.name.clone(), Type::Constructor(ctor));
        }
        Ok(Type::Enum(enum_ty))
    }

    fn check_interface(
        &mut self,
        decl: &mut InterfaceDecl,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let interface = Rc::new(TypeInterface {
            name: decl.name.clone(),
            generic_name: decl.generic.clone(),
            virtuals: decl.virtuals.clone(),
            concretes: decl.concretes.clone(),
            implementations: RefCell::new(Vec::new()),
        });
        env.set(&decl.name, Type::Interface(interface.clone()));

        env.enter();
        env.set(&decl.generic, Type::Interface(interface.clone()));
        env.enter();
        let previous = self.interface.replace(interface);
        let result = self.check_block(&mut decl.block, env);
        self.interface = previous;
        let exported = env.exit_frame();
        env.leave();
        result?;

        for (name, ty) in exported {
            env.set(name, ty);
        }
        self.primitive("void", env, &decl.position)
    }

    fn check_implementation(
        &mut self,
        decl: &mut ImplementationDecl,
        env: &mut Environment,
    ) -> Result<Type, TypeError> {
        let interface = match env.get(&decl.interface_name) {
            Some(Type::Interface(interface)) => interface,
            _ => {
                return Err(TypeError::unknown_interface(
                    decl.interface_name.clone(),
                    decl.position.clone(),
                ));
            }
        };
        let concrete = self.check_type_spec(&decl.target, env)?;
        let implementation = Rc::new(TypeImplementation {
            interface: Rc::downgrade(&interface),
            ty: concrete.clone(),
        });
        interface.implementations.borrow_mut().push(implementation);

        env.enter();
        env.set(&interface.generic_name, concrete.clone());
        env.enter();
        let previous = std::mem::replace(
            &mut self.implementation_suffix,
            format!("${}", concrete),
        );
        let result = self.check_implementation_block(decl, &interface, env);
        self.implementation_suffix = previous;
        let exported = env.exit_frame();
        env.leave();
        result?;

        for (name, ty) in exported {
            env.set(name, ty);
        }
        self.primitive("void", env, &decl.position)
    }

    fn check_implementation_block(
        &mut self,
        decl: &mut ImplementationDecl,
        interface: &Rc<TypeInterface>,
        env: &mut Environment,
    ) -> Result<(), TypeError> {
        let mut remaining = interface.virtuals.clone();
        for node in &mut decl.block.nodes {
            let name = match node {
                Node::Function(f) => f.name.clone(),
                Node::Prototype(p) => p.name.clone(),
                other => {
                    self.type_of(other, env)?;
                    continue;
                }
            };
            if let Some(index) = remaining.iter().position(|v| *v == name) {
                remaining.remove(index);
            } else if !interface.concretes.contains(&name) {
                return Err(TypeError::not_in_interface(
                    name,
                    interface.name.clone(),
                    node.position().clone(),
                ));
            }
            self.type_of(node, env)?;
        }
        if !remaining.is_empty() {
            return Err(TypeError::missing_virtuals(
                interface.name.clone(),
                remaining,
                decl.position.clone(),
            ));
        }
        Ok(())
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}
