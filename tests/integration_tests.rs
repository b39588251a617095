//! End-to-end pipeline tests: lex → parse → check → generate → run.

use verve::bytecode::Generator;
use verve::lexer::Token;
use verve::parser::Parser;
use verve::types::{self, Environment};
use verve::vm::{Value, Vm};

/// Compile and run a program, returning the value of its last top-level
/// expression
fn run(input: &str) -> Option<Value> {
    let tokens = Token::lex(input).expect("lexing failed");
    let mut parser = Parser::new(tokens);
    let mut program = parser.parse_program().expect("parsing failed");
    let mut env = Environment::global();
    types::check(&mut program, &mut env).expect("type checking failed");
    let mut generator = Generator::new();
    let bytecode = generator.generate(&program).expect("codegen failed");
    let mut vm = Vm::new();
    vm.run(&bytecode).expect("vm failed")
}

#[test]
fn test_arithmetic() {
    assert_eq!(run("1 + 2 * 3"), Some(Value::Int(7)));
}

#[test]
fn test_let_binding() {
    assert_eq!(run("let x = 1 { x + 2 }"), Some(Value::Int(3)));
}

#[test]
fn test_function_call() {
    assert_eq!(
        run("fn double(x: int) -> int { x * 2 } double(21)"),
        Some(Value::Int(42))
    );
}

#[test]
fn test_if_else() {
    assert_eq!(
        run("if true { 1 } else { 2 }"),
        Some(Value::Int(1))
    );
    assert_eq!(
        run("if false { 1 } else { 2 }"),
        Some(Value::Int(2))
    );
}

#[test]
fn test_list_construction() {
    assert_eq!(
        run("[1, 2, 3]"),
        Some(Value::List(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3)
        ]))
    );
}

#[test]
fn test_match_selects_by_tag() {
    assert_eq!(
        run("enum Maybe<T> { None Some(T) } match Some(3) { case Some(x): x case None: 0 }"),
        Some(Value::Int(3))
    );
    assert_eq!(
        run("enum Maybe<T> { None Some(T) } match None { case Some(x): x case None: 0 }"),
        Some(Value::Int(0))
    );
}

#[test]
fn test_match_binds_fields() {
    assert_eq!(
        run(
            "enum Pair { P(int, int) } match P(20, 22) { case P(a, b): a + b }"
        ),
        Some(Value::Int(42))
    );
}

#[test]
fn test_let_pattern_destructuring() {
    assert_eq!(
        run("enum Maybe<T> { None Some(T) } let Some(x) = Some(40) { x + 2 }"),
        Some(Value::Int(42))
    );
}

#[test]
fn test_interface_dispatch_runs_the_right_method() {
    let source = r#"
interface Describe<T> {
    virtual describe(T) -> string
}
impl Describe<int> {
    fn describe(n: int) -> string { "a number" }
}
impl Describe<string> {
    fn describe(s: string) -> string { s }
}
describe(5)
"#;
    assert_eq!(run(source), Some(Value::Str("a number".to_string())));

    let source = r#"
interface Describe<T> {
    virtual describe(T) -> string
}
impl Describe<int> {
    fn describe(n: int) -> string { "a number" }
}
impl Describe<string> {
    fn describe(s: string) -> string { s }
}
describe("words")
"#;
    assert_eq!(run(source), Some(Value::Str("words".to_string())));
}

#[test]
fn test_enum_constructor_cells() {
    assert_eq!(
        run("enum Color { Red Green Blue } Green"),
        Some(Value::Data {
            tag: 1,
            fields: Vec::new()
        })
    );
}

#[test]
fn test_nested_match() {
    let source = r#"
enum Maybe<T> { None Some(T) }
match Some(Some(5)) {
    case Some(inner): match inner {
        case Some(x): x + 1
        case None: 0
    }
    case None: 0
}
"#;
    assert_eq!(run(source), Some(Value::Int(6)));
}

#[test]
fn test_division_by_zero_is_a_runtime_error() {
    let tokens = Token::lex("1 / 0").expect("lexing failed");
    let mut parser = Parser::new(tokens);
    let mut program = parser.parse_program().expect("parsing failed");
    let mut env = Environment::global();
    types::check(&mut program, &mut env).expect("type checking failed");
    let mut generator = Generator::new();
    let bytecode = generator.generate(&program).expect("codegen failed");
    let mut vm = Vm::new();
    let result = vm.run(&bytecode);
    assert!(result.is_err());
    assert!(result.unwrap_err().message.contains("division by zero"));
}
