//! Instruction set for Verve bytecode.

use serde::{Deserialize, Serialize};

/// Builtins provided by the VM rather than compiled code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Builtin {
    Print,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    // Constants
    PushInt(i64),
    PushFloat(f64),
    PushStr(String),
    PushBool(bool),
    PushUnit,

    // Data structures
    MakeList(usize), // pops N items -> pushes List in original order
    /// Pops `size - 1` fields and pushes a constructor cell carrying the
    /// tag (the extra slot) plus its fields
    MakeData(usize, usize), // (tag, size)
    /// Pops a constructor cell, pushes its i-th field
    GetField(usize),

    // Locals
    LoadLocal(u16),
    StoreLocal(u16),

    // Stack
    Pop,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Not,

    // Control flow (absolute instruction index targets)
    Jump(usize),
    JumpIfFalse(usize),
    /// Pops a constructor cell; jumps when its tag differs
    JumpIfTagNot(usize, usize), // (tag, target)
    /// Non-exhaustive match trap
    NoMatch,

    // Calls
    Call(usize, usize), // (function_index, arg_count)
    CallBuiltin(Builtin, usize),
    Return,

    // Program control
    Halt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub arity: usize,
    pub local_count: usize,
    pub code: Vec<Instruction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<Function>,
    pub main: Function,
}
