//! Bytecode representation and generation for the Verve VM.

pub mod disassembler;
pub mod generator;
pub mod instruction;

pub use disassembler::disassemble;
pub use generator::Generator;
pub use instruction::{Builtin, Function, Instruction, Program};
