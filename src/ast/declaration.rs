//! Declaration nodes: enums, interfaces, implementations, functions,
//! prototypes, and the type-annotation forms they reference.

use lachs::Span;

use super::Block;

/// A type annotation as written in source.
///
/// # Variants
///
/// * `Basic` - a plain name (`int`, `string`, `Color`)
/// * `Data` - a parameterized application (`list<int>`, `Maybe<T>`)
/// * `Function` - a function shape (`(int, int) -> int`)
#[derive(Debug, Clone)]
pub enum TypeSpec {
    Basic(BasicTypeSpec),
    Data(DataTypeSpec),
    Function(FunctionTypeSpec),
}

impl TypeSpec {
    /// Get the source position of this annotation
    pub fn position(&self) -> &Span {
        match self {
            TypeSpec::Basic(b) => &b.position,
            TypeSpec::Data(d) => &d.position,
            TypeSpec::Function(f) => &f.position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BasicTypeSpec {
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct DataTypeSpec {
    pub name: String,
    pub params: Vec<TypeSpec>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionTypeSpec {
    pub generics: Vec<String>,
    pub params: Vec<TypeSpec>,
    pub returns: Box<TypeSpec>,
    pub position: Span,
}

/// `enum Name<T> { Ctor, Ctor(T, ...) }`
///
/// Constructors are tagged in declaration order, starting at 0.
#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub generics: Vec<String>,
    pub constructors: Vec<EnumConstructor>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct EnumConstructor {
    pub name: String,
    pub params: Vec<TypeSpec>,
    pub position: Span,
}

/// `interface Name<T> { ... }`
///
/// The `virtuals` and `concretes` name lists are collected by the parser
/// from the block's prototypes and functions; the checker uses them to
/// enforce implementation completeness.
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub generic: String,
    pub virtuals: Vec<String>,
    pub concretes: Vec<String>,
    pub block: Block,
    pub position: Span,
}

/// `impl Name<type> { ... }`
#[derive(Debug, Clone)]
pub struct ImplementationDecl {
    pub interface_name: String,
    pub target: TypeSpec,
    pub block: Block,
    pub position: Span,
}

/// `fn name<T>(a: int) -> int { ... }`
///
/// When parameters are written without annotations the function picks up
/// its type from a previously checked prototype of the same name, which
/// is how `impl` blocks can define methods without repeating the
/// interface signature. The checker suffixes `name` with the ambient
/// implementation type (`show` → `show$int`) while inside an `impl`.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub type_spec: Option<FunctionTypeSpec>,
    pub parameters: Vec<FunctionParameter>,
    pub body: Block,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionParameter {
    pub name: String,
    pub position: Span,
}

/// `virtual name(T) -> string` - a signature without a body.
#[derive(Debug, Clone)]
pub struct Prototype {
    pub name: String,
    pub is_virtual: bool,
    pub type_spec: FunctionTypeSpec,
    pub position: Span,
}
