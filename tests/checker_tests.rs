use verve::ast::{Node, Program};
use verve::lexer::Token;
use verve::parser::Parser;
use verve::types::{self, Environment, Type, TypeError};

/// Helper to lex, parse and type-check a program, returning the type of
/// its body
fn typecheck(input: &str) -> Result<Type, TypeError> {
    let (_, _, result) = typecheck_full(input);
    result
}

/// Same, but also hands back the annotated tree and the environment
fn typecheck_full(input: &str) -> (Program, Environment, Result<Type, TypeError>) {
    let tokens = Token::lex(input).expect("lexing failed");
    let mut parser = Parser::new(tokens);
    let mut program = parser.parse_program().expect("parsing failed");
    let mut env = Environment::global();
    let result = types::check(&mut program, &mut env);
    (program, env, result)
}

fn type_string(input: &str) -> String {
    typecheck(input).expect("expected program to check").to_string()
}

fn error_message(input: &str) -> String {
    typecheck(input)
        .expect_err("expected program to fail")
        .message()
}

// --- Primitive inference ---

#[test]
fn test_integer_literal_is_int() {
    assert_eq!(type_string("42"), "int");
}

#[test]
fn test_float_literal_is_float() {
    assert_eq!(type_string("3.14"), "float");
}

#[test]
fn test_string_literal_is_string() {
    assert_eq!(type_string(r#""hello""#), "string");
}

#[test]
fn test_boolean_identifiers() {
    assert_eq!(type_string("true"), "bool");
    assert_eq!(type_string("false"), "bool");
}

// --- Blocks ---

#[test]
fn test_block_types_as_last_node() {
    assert_eq!(type_string("1 \"two\" 3.0"), "float");
}

#[test]
fn test_empty_program_is_void() {
    assert_eq!(type_string(""), "void");
}

// --- Identifiers ---

#[test]
fn test_unknown_identifier() {
    assert_eq!(error_message("nope"), "Unknown identifier: `nope`");
}

// --- Let ---

#[test]
fn test_let_binds_into_block() {
    assert_eq!(type_string("let x = 1 { x + 2 }"), "int");
}

#[test]
fn test_let_bindings_see_earlier_assignments() {
    assert_eq!(type_string("let x = 1, y = x { y }"), "int");
}

#[test]
fn test_let_scope_does_not_leak() {
    assert_eq!(
        error_message("let x = 1 { x } x"),
        "Unknown identifier: `x`"
    );
}

#[test]
fn test_inner_let_shadows_outer() {
    assert_eq!(
        type_string(r#"let x = 1 { let x = "s" { x } }"#),
        "string"
    );
}

// --- If ---

#[test]
fn test_if_without_else_types_as_then() {
    assert_eq!(type_string("if true { 1 }"), "int");
}

#[test]
fn test_if_else_matching_branches() {
    assert_eq!(type_string("if true { 1 } else { 2 }"), "int");
}

#[test]
fn test_if_else_branch_mismatch() {
    assert_eq!(
        error_message(r#"if true { 1 } else { "x" }"#),
        "`if` and `else` branches evaluate to different types"
    );
}

// --- Binary and unary operations ---

#[test]
fn test_binary_operation_is_int() {
    assert_eq!(type_string("1 + 2 * 3"), "int");
}

#[test]
fn test_binary_operation_rejects_non_int() {
    assert_eq!(
        error_message(r#"1 + "two""#),
        "Binary operations only accept `int`, but found `string`"
    );
}

#[test]
fn test_binary_operation_rejects_float() {
    assert_eq!(
        error_message("1.5 + 1"),
        "Binary operations only accept `int`, but found `float`"
    );
}

#[test]
fn test_unary_operation_is_int() {
    assert_eq!(type_string("!1"), "int");
}

// --- Lists ---

#[test]
fn test_list_of_ints() {
    assert_eq!(type_string("[1, 2, 3]"), "list<int>");
}

#[test]
fn test_list_mixed_types_fails() {
    assert_eq!(
        error_message(r#"[1, 2, "three"]"#),
        "Lists can't have mixed types: `int` and `string`"
    );
}

// --- Functions and calls ---

#[test]
fn test_function_call_types_as_return() {
    assert_eq!(
        type_string("fn double(x: int) -> int { x * 2 } double(21)"),
        "int"
    );
}

#[test]
fn test_function_invalid_return_type() {
    assert_eq!(
        error_message(r#"fn f(x: int) -> int { "nope" }"#),
        "Invalid return type for function: expected `int` but got `string`"
    );
}

#[test]
fn test_call_arity_too_many() {
    assert_eq!(
        error_message("fn f(a: int) -> int { a } f(1, 2)"),
        "Wrong number of arguments for function call"
    );
}

#[test]
fn test_call_arity_too_few() {
    assert_eq!(
        error_message("fn f(a: int, b: int) -> int { a } f(1)"),
        "Wrong number of arguments for function call"
    );
}

#[test]
fn test_call_argument_mismatch() {
    assert_eq!(
        error_message(r#"fn f(a: int) -> int { a } f("x")"#),
        "Expected `int` but got `string` on arg #1 for function `f`"
    );
}

#[test]
fn test_call_non_function_fails() {
    assert_eq!(
        error_message("let x = 1 { x(2) }"),
        "Can't find type information for function call"
    );
}

#[test]
fn test_recursive_function_checks() {
    // The name is bound in the outer scope before the body is checked
    assert_eq!(
        type_string("fn f(x: int) -> int { f(x) } f(1)"),
        "int"
    );
}

// --- Generics ---

#[test]
fn test_generic_inference_int() {
    assert_eq!(type_string("fn id<T>(x: T) -> T { x } id(3)"), "int");
}

#[test]
fn test_generic_inference_string() {
    assert_eq!(
        type_string(r#"fn id<T>(x: T) -> T { x } id("hello")"#),
        "string"
    );
}

#[test]
fn test_generic_second_argument_must_agree() {
    assert_eq!(
        error_message(r#"fn pair<T>(a: T, b: T) -> T { a } pair(1, "x")"#),
        "Expected `int` but got `string` on arg #2 for function `pair`"
    );
}

// --- Enums and constructors ---

#[test]
fn test_constructor_tags_follow_declaration_order() {
    let (_, env, result) = typecheck_full("enum Color { Red Green Blue }");
    result.expect("expected program to check");
    for (name, tag) in [("Red", 0), ("Green", 1), ("Blue", 2)] {
        match env.get(name) {
            Some(Type::Constructor(ctor)) => assert_eq!(ctor.tag, tag, "tag of {name}"),
            other => panic!("expected constructor for {name}, got {other:?}"),
        }
    }
}

#[test]
fn test_constructor_application_types_as_applied_enum() {
    assert_eq!(
        type_string("enum Maybe<T> { None Some(T) } Some(3)"),
        "Maybe<int>"
    );
}

#[test]
fn test_constructor_annotations() {
    let (program, _, result) =
        typecheck_full("enum Maybe<T> { None Some(T) } Some(3)");
    result.expect("expected program to check");
    match &program.body.nodes[1] {
        Node::Constructor(ctor) => {
            assert_eq!(ctor.tag, Some(1));
            assert_eq!(ctor.size, Some(2));
        }
        other => panic!("expected constructor node, got {other:?}"),
    }
}

#[test]
fn test_constructor_argument_mismatch() {
    assert_eq!(
        error_message(r#"enum Maybe<T> { None Some(T) } enum Pair { P(int, int) } P(1, "x")"#),
        "Expected `int` but got `string` on arg #2 for function `P`"
    );
}

#[test]
fn test_constructor_out_of_scope() {
    // The parser knows `A` is a constructor, but its binding lived in
    // the function scope
    assert_eq!(
        error_message("fn f() -> int { enum M { A } 1 } A"),
        "Undefined constructor: `A`"
    );
}

// --- Match and patterns ---

#[test]
fn test_match_binds_pattern_variables() {
    assert_eq!(
        type_string("enum Maybe<T> { None Some(T) } match Some(3) { case Some(x): x case None: 0 }"),
        "int"
    );
}

#[test]
fn test_match_pattern_tags_are_annotated() {
    let (program, _, result) = typecheck_full(
        "enum Maybe<T> { None Some(T) } match Some(3) { case Some(x): x case None: 0 }",
    );
    result.expect("expected program to check");
    match &program.body.nodes[1] {
        Node::Match(m) => {
            assert_eq!(m.cases[0].pattern.tag, Some(1));
            assert_eq!(m.cases[1].pattern.tag, Some(0));
        }
        other => panic!("expected match node, got {other:?}"),
    }
}

#[test]
fn test_match_pattern_binding_uses_instantiated_type() {
    // x is bound to string inside the case body, so x + 1 must fail
    assert_eq!(
        error_message(
            r#"enum Maybe<T> { None Some(T) } match Some("s") { case Some(x): x + 1 case None: 0 }"#
        ),
        "Binary operations only accept `int`, but found `string`"
    );
}

#[test]
fn test_empty_match_fails() {
    assert_eq!(
        error_message("enum Maybe<T> { None Some(T) } match Some(3) { }"),
        "Cannot have `match` expression with no cases"
    );
}

#[test]
fn test_match_mixed_case_types() {
    assert_eq!(
        error_message(
            r#"enum Maybe<T> { None Some(T) } match Some(3) { case Some(x): x case None: "zero" }"#
        ),
        "Match can't have mixed types on its cases: `int` and `string`"
    );
}

#[test]
fn test_pattern_against_wrong_value_type() {
    assert_eq!(
        error_message("enum Maybe<T> { None Some(T) } match 3 { case Some(x): x }"),
        "Trying to pattern match value of type `int` with constructor `Some`"
    );
}

#[test]
fn test_pattern_unknown_constructor() {
    assert_eq!(
        error_message("enum Maybe<T> { None Some(T) } match Some(3) { case Huh(x): x }"),
        "Unknown constructor `Huh` on pattern match"
    );
}

#[test]
fn test_pattern_binding_count() {
    assert_eq!(
        error_message("enum Maybe<T> { None Some(T) } match Some(3) { case Some(x, y): x }"),
        "Wrong number of bindings for constructor `Some` on pattern match"
    );
}

#[test]
fn test_let_pattern_destructuring() {
    assert_eq!(
        type_string("enum Maybe<T> { None Some(T) } let Some(x) = Some(3) { x + 1 }"),
        "int"
    );
}

#[test]
fn test_match_case_bindings_do_not_leak() {
    assert_eq!(
        error_message(
            "enum Maybe<T> { None Some(T) } match Some(3) { case Some(x): x case None: 0 } x"
        ),
        "Unknown identifier: `x`"
    );
}

// --- Interfaces and implementations ---

const SHOW_INTERFACE: &str = r#"
interface Show<T> {
    virtual show(T) -> string
}
"#;

#[test]
fn test_interface_call_dispatches_to_implementation() {
    let source = format!(
        r#"{SHOW_INTERFACE}
impl Show<int> {{
    fn show(n: int) -> string {{ "int" }}
}}
show(5)
"#
    );
    let (program, _, result) = typecheck_full(&source);
    assert_eq!(result.expect("expected program to check").to_string(), "string");
    let call = program
        .body
        .nodes
        .iter()
        .find_map(|node| match node {
            Node::Call(call) => Some(call),
            _ => None,
        })
        .expect("expected a call node");
    assert_eq!(call.callee.name, "show$int");
}

#[test]
fn test_interface_call_without_impl_is_untouched() {
    let source = format!("{SHOW_INTERFACE}\nshow(5)");
    let (program, _, result) = typecheck_full(&source);
    assert_eq!(result.expect("expected program to check").to_string(), "string");
    let call = program
        .body
        .nodes
        .iter()
        .find_map(|node| match node {
            Node::Call(call) => Some(call),
            _ => None,
        })
        .expect("expected a call node");
    assert_eq!(call.callee.name, "show");
}

#[test]
fn test_implementation_method_names_are_mangled() {
    let source = format!(
        r#"{SHOW_INTERFACE}
impl Show<int> {{
    fn show(n: int) -> string {{ "int" }}
}}
"#
    );
    let (_, env, result) = typecheck_full(&source);
    result.expect("expected program to check");
    assert!(matches!(env.get("show$int"), Some(Type::Function(_))));
    // The unmangled name still resolves to the interface prototype
    match env.get("show") {
        Some(Type::Function(f)) => assert!(f.is_virtual),
        other => panic!("expected virtual prototype, got {other:?}"),
    }
}

#[test]
fn test_implementation_missing_virtuals() {
    let message = error_message(
        r#"
interface Eq<T> {
    virtual eq(T, T) -> int
    virtual neq(T, T) -> int
}
impl Eq<int> {
    fn eq(a: int, b: int) -> int { 1 }
}
"#,
    );
    assert_eq!(
        message,
        "Implementation `Eq` does not implement the following virtual functions: 1) neq"
    );
}

#[test]
fn test_implementation_of_unrelated_function() {
    let message = error_message(
        r#"
interface Show<T> {
    virtual show(T) -> string
}
impl Show<int> {
    fn show(n: int) -> string { "int" }
    fn extra(n: int) -> string { "nope" }
}
"#,
    );
    assert_eq!(
        message,
        "Defining function `extra` inside implementation `Show`, but it's not part of the interface"
    );
}

#[test]
fn test_implementation_method_without_annotations_uses_prototype() {
    let source = format!(
        r#"{SHOW_INTERFACE}
impl Show<int> {{
    fn show(n) {{ "int" }}
}}
show(7)
"#
    );
    let (program, _, result) = typecheck_full(&source);
    assert_eq!(result.expect("expected program to check").to_string(), "string");
    let call = program
        .body
        .nodes
        .iter()
        .find_map(|node| match node {
            Node::Call(call) => Some(call),
            _ => None,
        })
        .expect("expected a call node");
    assert_eq!(call.callee.name, "show$int");
}

#[test]
fn test_two_implementations_dispatch_separately() {
    let source = format!(
        r#"{SHOW_INTERFACE}
impl Show<int> {{
    fn show(n: int) -> string {{ "int" }}
}}
impl Show<string> {{
    fn show(s: string) -> string {{ s }}
}}
show("x")
"#
    );
    let (program, _, result) = typecheck_full(&source);
    assert_eq!(result.expect("expected program to check").to_string(), "string");
    let call = program
        .body
        .nodes
        .iter()
        .find_map(|node| match node {
            Node::Call(call) => Some(call),
            _ => None,
        })
        .expect("expected a call node");
    assert_eq!(call.callee.name, "show$string");
}

#[test]
fn test_unknown_interface_in_impl() {
    assert_eq!(
        error_message(r#"impl Huh<int> { fn f(n: int) -> int { n } }"#),
        "Unknown interface: `Huh`"
    );
}
