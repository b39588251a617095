use verve::ast::{AssignmentTarget, Node, Program, TypeSpec};
use verve::lexer::Token;
use verve::parser::Parser;

fn parse(input: &str) -> Program {
    let tokens = Token::lex(input).expect("lexing failed");
    let mut parser = Parser::new(tokens);
    parser.parse_program().expect("parsing failed")
}

fn parse_err(input: &str) -> String {
    let tokens = Token::lex(input).expect("lexing failed");
    let mut parser = Parser::new(tokens);
    match parser.parse_program() {
        Ok(_) => panic!("expected parse error"),
        Err(e) => e.message,
    }
}

#[test]
fn test_parse_function_with_annotations() {
    let program = parse("fn add(a: int, b: int) -> int { a + b }");
    match &program.body.nodes[0] {
        Node::Function(f) => {
            assert_eq!(f.name, "add");
            assert_eq!(f.parameters.len(), 2);
            let spec = f.type_spec.as_ref().expect("expected a signature");
            assert_eq!(spec.params.len(), 2);
            assert!(matches!(*spec.returns, TypeSpec::Basic(_)));
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn test_parse_function_without_annotations() {
    let program = parse("fn f(a, b) { a }");
    match &program.body.nodes[0] {
        Node::Function(f) => {
            assert!(f.type_spec.is_none());
            assert_eq!(f.parameters.len(), 2);
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn test_parse_function_defaults_to_void_return() {
    let program = parse("fn log(msg: string) { print(msg) }");
    match &program.body.nodes[0] {
        Node::Function(f) => {
            let spec = f.type_spec.as_ref().expect("expected a signature");
            match &*spec.returns {
                TypeSpec::Basic(b) => assert_eq!(b.name, "void"),
                other => panic!("expected basic return, got {other:?}"),
            }
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn test_parse_generic_function() {
    let program = parse("fn id<T>(x: T) -> T { x }");
    match &program.body.nodes[0] {
        Node::Function(f) => {
            let spec = f.type_spec.as_ref().expect("expected a signature");
            assert_eq!(spec.generics, vec!["T".to_string()]);
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn test_mixed_annotations_rejected() {
    let message = parse_err("fn f(a: int, b) -> int { a }");
    assert!(message.contains("mixes annotated and unannotated parameters"));
}

#[test]
fn test_constructor_names_are_recognized() {
    let program = parse("enum Maybe<T> { None Some(T) } Some(1) foo(1) None");
    assert!(matches!(program.body.nodes[1], Node::Constructor(_)));
    assert!(matches!(program.body.nodes[2], Node::Call(_)));
    // A bare constructor name is still an application
    assert!(matches!(program.body.nodes[3], Node::Constructor(_)));
}

#[test]
fn test_parse_enum_constructor_params() {
    let program = parse("enum Shape { Point Circle(int) Rect(int, int) }");
    match &program.body.nodes[0] {
        Node::Enum(e) => {
            assert_eq!(e.name, "Shape");
            assert_eq!(e.constructors.len(), 3);
            assert_eq!(e.constructors[0].params.len(), 0);
            assert_eq!(e.constructors[1].params.len(), 1);
            assert_eq!(e.constructors[2].params.len(), 2);
        }
        other => panic!("expected enum, got {other:?}"),
    }
}

#[test]
fn test_parse_match_with_bindings() {
    let program = parse(
        "enum Maybe<T> { None Some(T) } match Some(1) { case Some(x): x case None: 0 }",
    );
    match &program.body.nodes[1] {
        Node::Match(m) => {
            assert_eq!(m.cases.len(), 2);
            assert_eq!(m.cases[0].pattern.constructor, "Some");
            assert_eq!(m.cases[0].pattern.bindings.len(), 1);
            assert_eq!(m.cases[1].pattern.bindings.len(), 0);
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn test_parse_interface_collects_member_names() {
    let program = parse(
        r#"
interface Show<T> {
    virtual show(T) -> string
    fn twice(x: int) -> int { x * 2 }
}
"#,
    );
    match &program.body.nodes[0] {
        Node::Interface(i) => {
            assert_eq!(i.name, "Show");
            assert_eq!(i.generic, "T");
            assert_eq!(i.virtuals, vec!["show".to_string()]);
            assert_eq!(i.concretes, vec!["twice".to_string()]);
        }
        other => panic!("expected interface, got {other:?}"),
    }
}

#[test]
fn test_parse_impl_block() {
    let program = parse(
        r#"
interface Show<T> { virtual show(T) -> string }
impl Show<int> { fn show(n: int) -> string { "int" } }
"#,
    );
    match &program.body.nodes[1] {
        Node::Implementation(i) => {
            assert_eq!(i.interface_name, "Show");
            assert!(matches!(i.target, TypeSpec::Basic(_)));
            assert_eq!(i.block.nodes.len(), 1);
        }
        other => panic!("expected implementation, got {other:?}"),
    }
}

#[test]
fn test_parse_let_with_pattern_target() {
    let program = parse("enum Maybe<T> { None Some(T) } let Some(x) = Some(1) { x }");
    match &program.body.nodes[1] {
        Node::Let(l) => {
            assert_eq!(l.assignments.len(), 1);
            assert!(matches!(
                l.assignments[0].target,
                AssignmentTarget::Pattern(_)
            ));
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let program = parse("1 + 2 * 3");
    match &program.body.nodes[0] {
        Node::BinaryOperation(add) => {
            assert!(matches!(*add.lhs, Node::Number(_)));
            assert!(matches!(*add.rhs, Node::BinaryOperation(_)));
        }
        other => panic!("expected binary operation, got {other:?}"),
    }
}

#[test]
fn test_parse_parameterized_type_annotation() {
    let program = parse("fn first(xs: list<int>) -> int { 0 }");
    match &program.body.nodes[0] {
        Node::Function(f) => {
            let spec = f.type_spec.as_ref().expect("expected a signature");
            match &spec.params[0] {
                TypeSpec::Data(d) => {
                    assert_eq!(d.name, "list");
                    assert_eq!(d.params.len(), 1);
                }
                other => panic!("expected data type spec, got {other:?}"),
            }
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn test_parse_function_type_annotation() {
    let program = parse("fn apply(f: (int) -> int, x: int) -> int { f(x) }");
    match &program.body.nodes[0] {
        Node::Function(f) => {
            let spec = f.type_spec.as_ref().expect("expected a signature");
            assert!(matches!(spec.params[0], TypeSpec::Function(_)));
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn test_unterminated_block_is_an_error() {
    let message = parse_err("fn f(x: int) -> int { x");
    assert!(message.contains("unterminated block"));
}

#[test]
fn test_unexpected_token_is_an_error() {
    let message = parse_err("fn 42() { }");
    assert!(message.contains("expected identifier"));
}
