//! Human-readable listing of a bytecode program (`verve -d`).

use super::instruction::{Function, Instruction, Program};

pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();
    for function in &program.functions {
        disassemble_function(function, &mut out);
        out.push('\n');
    }
    disassemble_function(&program.main, &mut out);
    out
}

fn disassemble_function(function: &Function, out: &mut String) {
    out.push_str(&format!(
        "fn {} (arity: {}, locals: {})\n",
        function.name, function.arity, function.local_count
    ));
    for (index, instruction) in function.code.iter().enumerate() {
        out.push_str(&format!(
            "  {:04} {}\n",
            index,
            describe(instruction)
        ));
    }
}

fn describe(instruction: &Instruction) -> String {
    match instruction {
        Instruction::PushInt(n) => format!("push_int {}", n),
        Instruction::PushFloat(x) => format!("push_float {}", x),
        Instruction::PushStr(s) => format!("push_str {:?}", s),
        Instruction::PushBool(b) => format!("push_bool {}", b),
        Instruction::PushUnit => "push_unit".to_string(),
        Instruction::MakeList(n) => format!("make_list {}", n),
        Instruction::MakeData(tag, size) => format!("make_data tag={} size={}", tag, size),
        Instruction::GetField(i) => format!("get_field {}", i),
        Instruction::LoadLocal(i) => format!("load_local {}", i),
        Instruction::StoreLocal(i) => format!("store_local {}", i),
        Instruction::Pop => "pop".to_string(),
        Instruction::Add => "add".to_string(),
        Instruction::Sub => "sub".to_string(),
        Instruction::Mul => "mul".to_string(),
        Instruction::Div => "div".to_string(),
        Instruction::Not => "not".to_string(),
        Instruction::Jump(t) => format!("jump {:04}", t),
        Instruction::JumpIfFalse(t) => format!("jump_if_false {:04}", t),
        Instruction::JumpIfTagNot(tag, t) => format!("jump_if_tag_not tag={} {:04}", tag, t),
        Instruction::NoMatch => "no_match".to_string(),
        Instruction::Call(f, argc) => format!("call {} argc={}", f, argc),
        Instruction::CallBuiltin(b, argc) => format!("call_builtin {:?} argc={}", b, argc),
        Instruction::Return => "ret".to_string(),
        Instruction::Halt => "halt".to_string(),
    }
}
