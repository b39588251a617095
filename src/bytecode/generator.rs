//! Bytecode generator from the checked AST.
//!
//! Runs in two passes: first collect every function declaration
//! (including methods inside interface and impl blocks, which the
//! checker has already renamed to their mangled forms) and assign
//! indices, then emit code. The generator reads the annotations the type
//! checker wrote: constructor `tag`/`size` drive `MakeData`, pattern
//! tags drive match dispatch, and mangled call-site names resolve to the
//! mangled definitions.

use std::collections::HashMap;
use std::fmt;

use crate::ast::{self, AssignmentTarget, BinOp, Block, Node, NumberValue};

use super::instruction::{Builtin, Function as BcFunction, Instruction as BC, Program as BcProgram};

#[derive(Debug, Clone)]
pub struct CodegenError {
    pub message: String,
}

impl CodegenError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codegen error: {}", self.message)
    }
}

impl std::error::Error for CodegenError {}

pub type Result<T> = std::result::Result<T, CodegenError>;

fn error<T>(msg: impl Into<String>) -> Result<T> {
    Err(CodegenError::new(msg))
}

pub struct Generator {
    func_indices: HashMap<String, usize>,
    functions: Vec<BcFunction>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self {
            func_indices: HashMap::new(),
            functions: Vec::new(),
        }
    }

    pub fn generate(&mut self, program: &ast::Program) -> Result<BcProgram> {
        // First pass: collect function declarations and assign indices
        let mut declarations = Vec::new();
        collect_functions(&program.body, &mut declarations);
        for function in &declarations {
            if self.func_indices.contains_key(&function.name) {
                return error(format!("Duplicate function '{}'", function.name));
            }
            let index = self.functions.len();
            self.func_indices.insert(function.name.clone(), index);
            self.functions.push(BcFunction {
                name: function.name.clone(),
                arity: function.parameters.len(),
                local_count: 0,
                code: Vec::new(),
            });
        }

        // Second pass: compile bodies
        for function in &declarations {
            let index = match self.func_indices.get(&function.name) {
                Some(&i) => i,
                None => return error(format!("Unregistered function '{}'", function.name)),
            };
            let compiled = self.compile_function(function)?;
            self.functions[index] = compiled;
        }

        // Top-level expressions become the main body
        let mut builder = FuncBuilder::new("main".to_string(), 0);
        for node in &program.body.nodes {
            if builder.emit_node(self, node)? {
                builder.emit(BC::Pop);
            }
        }
        builder.emit(BC::Halt);
        let main = builder.finish();

        Ok(BcProgram {
            functions: self.functions.clone(),
            main,
        })
    }

    fn compile_function(&mut self, function: &ast::Function) -> Result<BcFunction> {
        let mut builder = FuncBuilder::new(function.name.clone(), function.parameters.len());
        for param in &function.parameters {
            builder.locals.declare(param.name.clone())?;
        }
        builder.emit_block_value(self, &function.body)?;
        builder.emit(BC::Return);
        Ok(builder.finish())
    }
}

/// Gather function declarations, looking inside interface and impl
/// blocks where methods live.
fn collect_functions<'a>(block: &'a Block, out: &mut Vec<&'a ast::Function>) {
    for node in &block.nodes {
        match node {
            Node::Function(f) => out.push(f),
            Node::Interface(i) => collect_functions(&i.block, out),
            Node::Implementation(i) => collect_functions(&i.block, out),
            _ => {}
        }
    }
}

fn builtin_of(name: &str) -> Option<Builtin> {
    match name {
        "print" => Some(Builtin::Print),
        _ => None,
    }
}

struct FuncBuilder {
    name: String,
    arity: usize,
    code: Vec<BC>,
    locals: Locals,
}

impl FuncBuilder {
    fn new(name: String, arity: usize) -> Self {
        Self {
            name,
            arity,
            code: Vec::new(),
            locals: Locals::new(),
        }
    }

    fn finish(self) -> BcFunction {
        BcFunction {
            name: self.name,
            arity: self.arity,
            local_count: self.locals.max_alloc as usize,
            code: self.code,
        }
    }

    fn emit(&mut self, instruction: BC) -> usize {
        self.code.push(instruction);
        self.code.len() - 1
    }

    fn here(&self) -> usize {
        self.code.len()
    }

    fn patch_to_here(&mut self, at: usize) -> Result<()> {
        let target = self.here();
        match &mut self.code[at] {
            BC::Jump(t) | BC::JumpIfFalse(t) | BC::JumpIfTagNot(_, t) => {
                *t = target;
                Ok(())
            }
            other => error(format!("cannot patch at {:?}", other)),
        }
    }

    /// Emit a node. Returns whether a value was left on the stack
    /// (declarations emit nothing).
    fn emit_node(&mut self, g: &Generator, node: &Node) -> Result<bool> {
        match node {
            Node::Enum(_)
            | Node::Interface(_)
            | Node::Implementation(_)
            | Node::Function(_)
            | Node::Prototype(_) => Ok(false),
            _ => {
                self.emit_expr(g, node)?;
                Ok(true)
            }
        }
    }

    /// Emit a block so that exactly one value is left on the stack.
    fn emit_block_value(&mut self, g: &Generator, block: &Block) -> Result<()> {
        let mut pushed = false;
        for (i, node) in block.nodes.iter().enumerate() {
            let last = i + 1 == block.nodes.len();
            pushed = self.emit_node(g, node)?;
            if pushed && !last {
                self.emit(BC::Pop);
            }
        }
        if !pushed {
            self.emit(BC::PushUnit);
        }
        Ok(())
    }

    fn emit_expr(&mut self, g: &Generator, node: &Node) -> Result<()> {
        match node {
            Node::Number(n) => {
                match n.value {
                    NumberValue::Int(v) => self.emit(BC::PushInt(v)),
                    NumberValue::Float(v) => self.emit(BC::PushFloat(v)),
                };
                Ok(())
            }
            Node::String(s) => {
                self.emit(BC::PushStr(s.value.clone()));
                Ok(())
            }
            Node::Identifier(id) => match id.name.as_str() {
                "true" => {
                    self.emit(BC::PushBool(true));
                    Ok(())
                }
                "false" => {
                    self.emit(BC::PushBool(false));
                    Ok(())
                }
                name => {
                    let slot = self
                        .locals
                        .resolve(name)
                        .ok_or_else(|| CodegenError::new(format!("Undefined variable '{}'", name)))?;
                    self.emit(BC::LoadLocal(slot));
                    Ok(())
                }
            },
            Node::List(list) => {
                for item in &list.items {
                    self.emit_expr(g, item)?;
                }
                self.emit(BC::MakeList(list.items.len()));
                Ok(())
            }
            Node::Let(let_) => {
                self.locals.push_scope();
                for assignment in &let_.assignments {
                    self.emit_assignment(g, assignment)?;
                }
                self.emit_block_value(g, &let_.block)?;
                self.locals.pop_scope();
                Ok(())
            }
            Node::If(if_) => {
                self.emit_expr(g, &if_.condition)?;
                let jf_at = self.emit(BC::JumpIfFalse(0));
                self.emit_block_value(g, &if_.then_block)?;
                let jend_at = self.emit(BC::Jump(0));
                self.patch_to_here(jf_at)?;
                match &if_.else_block {
                    Some(else_block) => self.emit_block_value(g, else_block)?,
                    None => {
                        self.emit(BC::PushUnit);
                    }
                }
                self.patch_to_here(jend_at)?;
                Ok(())
            }
            Node::Match(match_) => self.emit_match(g, match_),
            Node::UnaryOperation(u) => {
                self.emit_expr(g, &u.operand)?;
                self.emit(BC::Not);
                Ok(())
            }
            Node::BinaryOperation(b) => {
                self.emit_expr(g, &b.lhs)?;
                self.emit_expr(g, &b.rhs)?;
                self.emit(match b.op {
                    BinOp::Add => BC::Add,
                    BinOp::Sub => BC::Sub,
                    BinOp::Mul => BC::Mul,
                    BinOp::Div => BC::Div,
                });
                Ok(())
            }
            Node::Call(call) => {
                if let Some(builtin) = builtin_of(&call.callee.name) {
                    for argument in &call.arguments {
                        self.emit_expr(g, argument)?;
                    }
                    self.emit(BC::CallBuiltin(builtin, call.arguments.len()));
                    return Ok(());
                }
                let &index = g.func_indices.get(&call.callee.name).ok_or_else(|| {
                    CodegenError::new(format!("Undefined function '{}'", call.callee.name))
                })?;
                for argument in &call.arguments {
                    self.emit_expr(g, argument)?;
                }
                self.emit(BC::Call(index, call.arguments.len()));
                Ok(())
            }
            Node::Constructor(ctor) => {
                let (tag, size) = match (ctor.tag, ctor.size) {
                    (Some(tag), Some(size)) => (tag, size),
                    _ => {
                        return error(format!(
                            "constructor '{}' was not annotated by the checker",
                            ctor.name.name
                        ));
                    }
                };
                for argument in &ctor.arguments {
                    self.emit_expr(g, argument)?;
                }
                self.emit(BC::MakeData(tag, size));
                Ok(())
            }
            Node::Enum(_)
            | Node::Interface(_)
            | Node::Implementation(_)
            | Node::Function(_)
            | Node::Prototype(_) => error("declaration in expression position"),
        }
    }

    fn emit_assignment(&mut self, g: &Generator, assignment: &ast::Assignment) -> Result<()> {
        self.emit_expr(g, &assignment.value)?;
        match &assignment.target {
            AssignmentTarget::Identifier(id) => {
                let slot = self.locals.declare(id.name.clone())?;
                self.emit(BC::StoreLocal(slot));
                Ok(())
            }
            AssignmentTarget::Pattern(pattern) => {
                let temp = self.locals.alloc_temp();
                self.emit(BC::StoreLocal(temp));
                for (i, binding) in pattern.bindings.iter().enumerate() {
                    let slot = self.locals.declare(binding.name.clone())?;
                    self.emit(BC::LoadLocal(temp));
                    self.emit(BC::GetField(i));
                    self.emit(BC::StoreLocal(slot));
                }
                Ok(())
            }
        }
    }

    fn emit_match(&mut self, g: &Generator, match_: &ast::Match) -> Result<()> {
        self.emit_expr(g, &match_.subject)?;
        let temp = self.locals.alloc_temp();
        self.emit(BC::StoreLocal(temp));

        let mut end_jumps = Vec::new();
        let mut next_case: Option<usize> = None;
        for case in &match_.cases {
            if let Some(at) = next_case.take() {
                self.patch_to_here(at)?;
            }
            let tag = case.pattern.tag.ok_or_else(|| {
                CodegenError::new(format!(
                    "pattern '{}' was not annotated by the checker",
                    case.pattern.constructor
                ))
            })?;
            self.emit(BC::LoadLocal(temp));
            next_case = Some(self.emit(BC::JumpIfTagNot(tag, 0)));

            self.locals.push_scope();
            for (i, binding) in case.pattern.bindings.iter().enumerate() {
                let slot = self.locals.declare(binding.name.clone())?;
                self.emit(BC::LoadLocal(temp));
                self.emit(BC::GetField(i));
                self.emit(BC::StoreLocal(slot));
            }
            self.emit_block_value(g, &case.body)?;
            self.locals.pop_scope();
            end_jumps.push(self.emit(BC::Jump(0)));
        }
        if let Some(at) = next_case {
            self.patch_to_here(at)?;
        }
        self.emit(BC::NoMatch);
        for at in end_jumps {
            self.patch_to_here(at)?;
        }
        Ok(())
    }
}

struct Locals {
    scopes: Vec<HashMap<String, u16>>, // name -> slot
    next: u16,
    max_alloc: u16,
}

impl Locals {
    fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            next: 0,
            max_alloc: 0,
        }
    }

    fn declare(&mut self, name: String) -> Result<u16> {
        let slot = self.next;
        self.next = match self.next.checked_add(1) {
            Some(n) => n,
            None => return error("too many locals"),
        };
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, slot);
        }
        if slot + 1 > self.max_alloc {
            self.max_alloc = slot + 1;
        }
        Ok(slot)
    }

    fn resolve(&self, name: &str) -> Option<u16> {
        for scope in self.scopes.iter().rev() {
            if let Some(&slot) = scope.get(name) {
                return Some(slot);
            }
        }
        None
    }

    fn alloc_temp(&mut self) -> u16 {
        let slot = self.next;
        self.next += 1;
        if slot + 1 > self.max_alloc {
            self.max_alloc = slot + 1;
        }
        slot
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        let _ = self.scopes.pop();
    }
}
