//! Verve VM core: a frame-per-call stack machine.

use crate::bytecode::{Builtin, Instruction, Program};

use super::value::Value;
use super::{error, Result};

#[derive(Clone)]
struct Frame {
    func_ref: CodeRef,
    ip: usize,
    locals: Vec<Value>,
}

#[derive(Clone, Copy)]
enum CodeRef {
    Main,
    Func(usize),
}

pub struct Vm {
    stack: Vec<Value>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    fn pop(&mut self, context: &str) -> Result<Value> {
        self.stack
            .pop()
            .ok_or_else(|| format!("stack underflow in {}", context).into())
    }

    /// Execute a program. Returns the value of the last top-level
    /// expression, if any.
    pub fn run(&mut self, program: &Program) -> Result<Option<Value>> {
        let mut frames: Vec<Frame> = vec![Frame {
            func_ref: CodeRef::Main,
            ip: 0,
            locals: vec![Value::Unit; program.main.local_count],
        }];

        let mut last_value: Option<Value> = None;
        while let Some(frame) = frames.last_mut() {
            let func = match frame.func_ref {
                CodeRef::Main => &program.main,
                CodeRef::Func(i) => &program.functions[i],
            };
            if frame.ip >= func.code.len() {
                // Running off the end returns Unit
                if frames.len() == 1 {
                    break;
                }
                frames.pop();
                self.stack.push(Value::Unit);
                continue;
            }
            let instruction = func.code[frame.ip].clone();
            // default ip increment; jumps override
            frame.ip += 1;
            match instruction {
                Instruction::PushInt(n) => self.stack.push(Value::Int(n)),
                Instruction::PushFloat(x) => self.stack.push(Value::Float(x)),
                Instruction::PushStr(s) => self.stack.push(Value::Str(s)),
                Instruction::PushBool(b) => self.stack.push(Value::Bool(b)),
                Instruction::PushUnit => self.stack.push(Value::Unit),
                Instruction::MakeList(n) => {
                    if self.stack.len() < n {
                        return error("stack underflow in make_list");
                    }
                    let start = self.stack.len() - n;
                    let items = self.stack.drain(start..).collect::<Vec<_>>();
                    self.stack.push(Value::List(items));
                }
                Instruction::MakeData(tag, size) => {
                    let count = size.saturating_sub(1);
                    if self.stack.len() < count {
                        return error("stack underflow in make_data");
                    }
                    let start = self.stack.len() - count;
                    let fields = self.stack.drain(start..).collect::<Vec<_>>();
                    self.stack.push(Value::Data { tag, fields });
                }
                Instruction::GetField(i) => {
                    let value = self.pop("get_field")?;
                    match value {
                        Value::Data { fields, .. } => match fields.get(i) {
                            Some(field) => self.stack.push(field.clone()),
                            None => return error("constructor field out of bounds"),
                        },
                        other => {
                            return error(format!("get_field expects data, got {:?}", other));
                        }
                    }
                }
                Instruction::LoadLocal(i) => {
                    let value = frame
                        .locals
                        .get(i as usize)
                        .cloned()
                        .ok_or("invalid local index")?;
                    self.stack.push(value);
                }
                Instruction::StoreLocal(i) => {
                    let value = self.pop("store_local")?;
                    let slot = frame
                        .locals
                        .get_mut(i as usize)
                        .ok_or("invalid local index")?;
                    *slot = value;
                }
                Instruction::Pop => {
                    if let Some(value) = self.stack.pop() {
                        last_value = Some(value);
                    }
                }
                Instruction::Add => {
                    let b = self.pop("add")?;
                    let a = self.pop("add")?;
                    match (a, b) {
                        (Value::Int(x), Value::Int(y)) => self.stack.push(Value::Int(x + y)),
                        (Value::Str(x), Value::Str(y)) => {
                            self.stack.push(Value::Str(format!("{}{}", x, y)))
                        }
                        (x, y) => return error(format!("Cannot add {:?} and {:?}", x, y)),
                    }
                }
                Instruction::Sub => {
                    let b = self.pop("sub")?;
                    let a = self.pop("sub")?;
                    match (a, b) {
                        (Value::Int(x), Value::Int(y)) => self.stack.push(Value::Int(x - y)),
                        (x, y) => return error(format!("Cannot subtract {:?} and {:?}", x, y)),
                    }
                }
                Instruction::Mul => {
                    let b = self.pop("mul")?;
                    let a = self.pop("mul")?;
                    match (a, b) {
                        (Value::Int(x), Value::Int(y)) => self.stack.push(Value::Int(x * y)),
                        (x, y) => return error(format!("Cannot multiply {:?} and {:?}", x, y)),
                    }
                }
                Instruction::Div => {
                    let b = self.pop("div")?;
                    let a = self.pop("div")?;
                    match (a, b) {
                        (Value::Int(_), Value::Int(0)) => return error("division by zero"),
                        (Value::Int(x), Value::Int(y)) => self.stack.push(Value::Int(x / y)),
                        (x, y) => return error(format!("Cannot divide {:?} and {:?}", x, y)),
                    }
                }
                Instruction::Not => {
                    let a = self.pop("not")?;
                    match a {
                        Value::Bool(b) => self.stack.push(Value::Bool(!b)),
                        Value::Int(n) => self.stack.push(Value::Int(if n == 0 { 1 } else { 0 })),
                        other => return error(format!("! expects bool or int, got {:?}", other)),
                    }
                }
                Instruction::Jump(target) => {
                    frame.ip = target;
                }
                Instruction::JumpIfFalse(target) => {
                    let condition = self.pop("jump_if_false")?;
                    match condition {
                        Value::Bool(false) => frame.ip = target,
                        Value::Bool(true) => (),
                        other => {
                            return error(format!("condition must be bool, got {:?}", other));
                        }
                    }
                }
                Instruction::JumpIfTagNot(tag, target) => {
                    let value = self.pop("jump_if_tag_not")?;
                    match value {
                        Value::Data { tag: actual, .. } => {
                            if actual != tag {
                                frame.ip = target;
                            }
                        }
                        other => {
                            return error(format!("match expects data, got {:?}", other));
                        }
                    }
                }
                Instruction::NoMatch => {
                    return error("no case matched in match expression");
                }
                Instruction::Call(fi, argc) => {
                    if self.stack.len() < argc {
                        return error("stack underflow in call");
                    }
                    let start = self.stack.len() - argc;
                    let mut args = self.stack.drain(start..).collect::<Vec<_>>();
                    let func = program
                        .functions
                        .get(fi)
                        .ok_or("invalid function index")?;
                    if func.arity != argc {
                        return error(format!(
                            "Function '{}' expected {} args, got {}",
                            func.name, func.arity, argc
                        ));
                    }
                    let mut locals = vec![Value::Unit; func.local_count];
                    for (i, value) in args.drain(..).enumerate() {
                        locals[i] = value;
                    }
                    frames.push(Frame {
                        func_ref: CodeRef::Func(fi),
                        ip: 0,
                        locals,
                    });
                }
                Instruction::Return => {
                    let ret = self.stack.pop().unwrap_or(Value::Unit);
                    frames.pop();
                    if frames.is_empty() {
                        break;
                    }
                    self.stack.push(ret);
                }
                Instruction::CallBuiltin(which, argc) => {
                    if self.stack.len() < argc {
                        return error("stack underflow in call_builtin");
                    }
                    let start = self.stack.len() - argc;
                    let args = self.stack.drain(start..).collect::<Vec<_>>();
                    match which {
                        Builtin::Print => {
                            if args.len() != 1 {
                                return error("print() expects exactly 1 argument");
                            }
                            println!("{}", args[0]);
                            self.stack.push(Value::Unit);
                        }
                    }
                }
                Instruction::Halt => {
                    break;
                }
            }
        }
        Ok(last_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Function;

    fn make_simple_program(main_code: Vec<Instruction>) -> Program {
        Program {
            functions: Vec::new(),
            main: Function {
                name: "main".to_string(),
                arity: 0,
                local_count: 2,
                code: main_code,
            },
        }
    }

    #[test]
    fn test_vm_arithmetic() {
        let cases = vec![
            (
                vec![
                    Instruction::PushInt(10),
                    Instruction::PushInt(3),
                    Instruction::Add,
                ],
                Value::Int(13),
            ),
            (
                vec![
                    Instruction::PushInt(10),
                    Instruction::PushInt(3),
                    Instruction::Sub,
                ],
                Value::Int(7),
            ),
            (
                vec![
                    Instruction::PushInt(10),
                    Instruction::PushInt(3),
                    Instruction::Mul,
                ],
                Value::Int(30),
            ),
            (
                vec![
                    Instruction::PushInt(10),
                    Instruction::PushInt(3),
                    Instruction::Div,
                ],
                Value::Int(3),
            ),
        ];
        for (mut code, expected) in cases {
            code.push(Instruction::Pop);
            let mut vm = Vm::new();
            let program = make_simple_program(code);
            let result = vm.run(&program).unwrap();
            assert_eq!(result, Some(expected));
        }
    }

    #[test]
    fn test_vm_division_by_zero() {
        let mut vm = Vm::new();
        let program = make_simple_program(vec![
            Instruction::PushInt(1),
            Instruction::PushInt(0),
            Instruction::Div,
        ]);
        let result = vm.run(&program);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("division by zero"));
    }

    #[test]
    fn test_vm_stack_underflow() {
        let mut vm = Vm::new();
        let program = make_simple_program(vec![Instruction::PushInt(5), Instruction::Add]);
        let result = vm.run(&program);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("stack underflow"));
    }

    #[test]
    fn test_vm_make_data_and_get_field() {
        let mut vm = Vm::new();
        // Some(42) as tag=1, size=2, then read field 0
        let program = make_simple_program(vec![
            Instruction::PushInt(42),
            Instruction::MakeData(1, 2),
            Instruction::GetField(0),
            Instruction::Pop,
        ]);
        let result = vm.run(&program).unwrap();
        assert_eq!(result, Some(Value::Int(42)));
    }

    #[test]
    fn test_vm_tag_dispatch() {
        let mut vm = Vm::new();
        // match None { case tag 0 -> 7 }: builds Data(tag=0), dispatches
        let program = make_simple_program(vec![
            Instruction::MakeData(0, 1),
            Instruction::StoreLocal(0),
            Instruction::LoadLocal(0),
            Instruction::JumpIfTagNot(0, 6),
            Instruction::PushInt(7),
            Instruction::Jump(7),
            Instruction::NoMatch,
            Instruction::Pop,
        ]);
        let result = vm.run(&program).unwrap();
        assert_eq!(result, Some(Value::Int(7)));
    }

    #[test]
    fn test_vm_no_match_traps() {
        let mut vm = Vm::new();
        let program = make_simple_program(vec![
            Instruction::MakeData(1, 1),
            Instruction::StoreLocal(0),
            Instruction::LoadLocal(0),
            Instruction::JumpIfTagNot(0, 6),
            Instruction::PushInt(7),
            Instruction::Jump(7),
            Instruction::NoMatch,
            Instruction::Pop,
        ]);
        let result = vm.run(&program);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("no case matched"));
    }

    #[test]
    fn test_vm_function_call() {
        let double = Function {
            name: "double".to_string(),
            arity: 1,
            local_count: 1,
            code: vec![
                Instruction::LoadLocal(0),
                Instruction::PushInt(2),
                Instruction::Mul,
                Instruction::Return,
            ],
        };
        let program = Program {
            functions: vec![double],
            main: Function {
                name: "main".to_string(),
                arity: 0,
                local_count: 0,
                code: vec![
                    Instruction::PushInt(21),
                    Instruction::Call(0, 1),
                    Instruction::Pop,
                    Instruction::Halt,
                ],
            },
        };
        let mut vm = Vm::new();
        let result = vm.run(&program).unwrap();
        assert_eq!(result, Some(Value::Int(42)));
    }

    #[test]
    fn test_vm_locals() {
        let mut vm = Vm::new();
        let program = make_simple_program(vec![
            Instruction::PushInt(42),
            Instruction::StoreLocal(0),
            Instruction::LoadLocal(0),
            Instruction::Pop,
        ]);
        let result = vm.run(&program).unwrap();
        assert_eq!(result, Some(Value::Int(42)));
    }
}
