//! # Parser
//!
//! Recursive-descent parser from the token stream to the AST. The
//! grammar is keyword-directed, so each production is a method that
//! inspects the next token and commits - no backtracking is needed.
//!
//! The parser keeps a set of constructor names collected from `enum`
//! declarations. A call (or bare identifier) whose name is a known
//! constructor parses as a `Constructor` node rather than a `Call`, and
//! a `let` left-hand side naming a constructor parses as a destructuring
//! pattern. Inside `case` clauses every head is a pattern, known
//! constructor or not - the type checker owns that diagnostic.

use std::collections::HashSet;

use lachs::Span;

use crate::ast::{
    Assignment, AssignmentTarget, BasicTypeSpec, BinOp, BinaryOperation, Block, Call, Case,
    Constructor, DataTypeSpec, EnumConstructor, EnumDecl, Function, FunctionParameter,
    FunctionTypeSpec, Identifier, If, ImplementationDecl, InterfaceDecl, Let, List, Match, Node,
    Number, NumberValue, Pattern, Program, Prototype, StringLit, TypeSpec, UnaryOperation,
};
use crate::lexer::Token;

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            span: None,
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.span {
            Some(span) if !span.source.is_empty() => write!(f, "{}", span.to_string(&self.message)),
            _ => write!(f, "Parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    constructors: HashSet<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            constructors: HashSet::new(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let message = message.into();
        match self.peek() {
            Some(token) => {
                ParseError::new(format!("{}, found {}", message, token.describe()))
                    .at(token.pos())
            }
            None => ParseError::new(format!("{}, found end of input", message)),
        }
    }

    fn expect<F: Fn(&Token) -> bool>(&mut self, pred: F, what: &str) -> ParseResult<Token> {
        match self.peek() {
            Some(token) if pred(token) => Ok(self.next().unwrap_or_else(|| unreachable!())),
            _ => Err(self.error_here(format!("expected {}", what))),
        }
    }

    fn ident(&mut self) -> ParseResult<(String, Span)> {
        match self.peek() {
            Some(Token::Ident(_)) => match self.next() {
                Some(Token::Ident(inner)) => Ok((inner.value, inner.position)),
                _ => Err(self.error_here("expected identifier")),
            },
            _ => Err(self.error_here("expected identifier")),
        }
    }

    /// program := item*
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let position = self.peek().map(|t| t.pos()).unwrap_or_default();
        let mut nodes = Vec::new();
        while self.has_next() {
            nodes.push(self.parse_item()?);
        }
        Ok(Program {
            body: Block { nodes, position },
        })
    }

    /// item := function | enum | interface | implementation | prototype | expression
    fn parse_item(&mut self) -> ParseResult<Node> {
        match self.peek() {
            Some(Token::KwFn(_)) => self.parse_function().map(Node::Function),
            Some(Token::Enum(_)) => self.parse_enum().map(Node::Enum),
            Some(Token::Interface(_)) => self.parse_interface().map(Node::Interface),
            Some(Token::Impl(_)) => self.parse_implementation().map(Node::Implementation),
            Some(Token::Virtual(_)) => self.parse_prototype().map(Node::Prototype),
            _ => self.parse_expression(),
        }
    }

    /// block := "{" item* "}"
    fn parse_block(&mut self) -> ParseResult<Block> {
        let open = self.expect(|t| matches!(t, Token::LBrace(_)), "'{'")?;
        let mut nodes = Vec::new();
        while !matches!(self.peek(), Some(Token::RBrace(_))) {
            if !self.has_next() {
                return Err(ParseError::new("unterminated block, expected '}'").at(open.pos()));
            }
            nodes.push(self.parse_item()?);
        }
        self.expect(|t| matches!(t, Token::RBrace(_)), "'}'")?;
        Ok(Block {
            nodes,
            position: open.pos(),
        })
    }

    /// expression := let | if | match | binary
    fn parse_expression(&mut self) -> ParseResult<Node> {
        match self.peek() {
            Some(Token::Let(_)) => self.parse_let().map(Node::Let),
            Some(Token::If(_)) => self.parse_if().map(Node::If),
            Some(Token::KwMatch(_)) => self.parse_match().map(Node::Match),
            _ => self.parse_binary(),
        }
    }

    /// binary := term (("+" | "-") term)*
    fn parse_binary(&mut self) -> ParseResult<Node> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus(_)) => BinOp::Add,
                Some(Token::Minus(_)) => BinOp::Sub,
                _ => break,
            };
            let token = self.next().unwrap_or_else(|| unreachable!());
            let rhs = self.parse_term()?;
            lhs = Node::BinaryOperation(BinaryOperation {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position: token.pos(),
            });
        }
        Ok(lhs)
    }

    /// term := unary (("*" | "/") unary)*
    fn parse_term(&mut self) -> ParseResult<Node> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star(_)) => BinOp::Mul,
                Some(Token::Slash(_)) => BinOp::Div,
                _ => break,
            };
            let token = self.next().unwrap_or_else(|| unreachable!());
            let rhs = self.parse_unary()?;
            lhs = Node::BinaryOperation(BinaryOperation {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position: token.pos(),
            });
        }
        Ok(lhs)
    }

    /// unary := "!" unary | primary
    fn parse_unary(&mut self) -> ParseResult<Node> {
        if let Some(Token::Bang(_)) = self.peek() {
            let token = self.next().unwrap_or_else(|| unreachable!());
            let operand = self.parse_unary()?;
            return Ok(Node::UnaryOperation(UnaryOperation {
                operand: Box::new(operand),
                position: token.pos(),
            }));
        }
        self.parse_primary()
    }

    /// primary := number | string | list | call | constructor | identifier
    fn parse_primary(&mut self) -> ParseResult<Node> {
        match self.peek() {
            Some(Token::Integer(_)) => match self.next() {
                Some(Token::Integer(inner)) => {
                    let value = inner.value.parse::<i64>().map_err(|_| {
                        ParseError::new(format!("invalid integer literal '{}'", inner.value))
                            .at(inner.position.clone())
                    })?;
                    Ok(Node::Number(Number {
                        value: NumberValue::Int(value),
                        position: inner.position,
                    }))
                }
                _ => Err(self.error_here("expected integer")),
            },
            Some(Token::Float(_)) => match self.next() {
                Some(Token::Float(inner)) => {
                    let value = inner.value.parse::<f64>().map_err(|_| {
                        ParseError::new(format!("invalid float literal '{}'", inner.value))
                            .at(inner.position.clone())
                    })?;
                    Ok(Node::Number(Number {
                        value: NumberValue::Float(value),
                        position: inner.position,
                    }))
                }
                _ => Err(self.error_here("expected float")),
            },
            Some(Token::StringLiteral(_)) => match self.next() {
                Some(Token::StringLiteral(inner)) => Ok(Node::String(StringLit {
                    value: unquote(&inner.value),
                    position: inner.position,
                })),
                _ => Err(self.error_here("expected string")),
            },
            Some(Token::LBracket(_)) => self.parse_list(),
            Some(Token::Ident(_)) => self.parse_identifier_expression(),
            _ => Err(self.error_here("expected expression")),
        }
    }

    /// list := "[" (expression ("," expression)*)? "]"
    fn parse_list(&mut self) -> ParseResult<Node> {
        let open = self.expect(|t| matches!(t, Token::LBracket(_)), "'['")?;
        let mut items = Vec::new();
        if !matches!(self.peek(), Some(Token::RBracket(_))) {
            loop {
                items.push(self.parse_expression()?);
                if matches!(self.peek(), Some(Token::Comma(_))) {
                    self.next();
                } else {
                    break;
                }
            }
        }
        self.expect(|t| matches!(t, Token::RBracket(_)), "']'")?;
        Ok(Node::List(List {
            items,
            position: open.pos(),
        }))
    }

    /// call := identifier "(" (expression ("," expression)*)? ")"
    ///
    /// An identifier naming a declared constructor becomes a
    /// `Constructor` node, with or without an argument list.
    fn parse_identifier_expression(&mut self) -> ParseResult<Node> {
        let (name, position) = self.ident()?;
        let is_constructor = self.constructors.contains(&name);
        if matches!(self.peek(), Some(Token::LParen(_))) {
            self.next();
            let mut arguments = Vec::new();
            if !matches!(self.peek(), Some(Token::RParen(_))) {
                loop {
                    arguments.push(self.parse_expression()?);
                    if matches!(self.peek(), Some(Token::Comma(_))) {
                        self.next();
                    } else {
                        break;
                    }
                }
            }
            self.expect(|t| matches!(t, Token::RParen(_)), "')'")?;
            if is_constructor {
                return Ok(Node::Constructor(Constructor {
                    name: Identifier {
                        name,
                        position: position.clone(),
                    },
                    arguments,
                    tag: None,
                    size: None,
                    position,
                }));
            }
            return Ok(Node::Call(Call {
                callee: Identifier {
                    name,
                    position: position.clone(),
                },
                arguments,
                position,
            }));
        }
        if is_constructor {
            return Ok(Node::Constructor(Constructor {
                name: Identifier {
                    name,
                    position: position.clone(),
                },
                arguments: Vec::new(),
                tag: None,
                size: None,
                position,
            }));
        }
        Ok(Node::Identifier(Identifier { name, position }))
    }

    /// let := "let" assignment ("," assignment)* block
    fn parse_let(&mut self) -> ParseResult<Let> {
        let keyword = self.expect(|t| matches!(t, Token::Let(_)), "'let'")?;
        let mut assignments = vec![self.parse_assignment()?];
        while matches!(self.peek(), Some(Token::Comma(_))) {
            self.next();
            assignments.push(self.parse_assignment()?);
        }
        let block = self.parse_block()?;
        Ok(Let {
            assignments,
            block,
            position: keyword.pos(),
        })
    }

    /// assignment := (identifier | pattern) "=" expression
    fn parse_assignment(&mut self) -> ParseResult<Assignment> {
        let (name, position) = self.ident()?;
        let target = if self.constructors.contains(&name) {
            AssignmentTarget::Pattern(self.parse_pattern_tail(name, position.clone())?)
        } else {
            AssignmentTarget::Identifier(Identifier {
                name,
                position: position.clone(),
            })
        };
        self.expect(|t| matches!(t, Token::Equals(_)), "'='")?;
        let value = self.parse_expression()?;
        Ok(Assignment {
            target,
            value: Box::new(value),
            position,
        })
    }

    /// if := "if" expression block ("else" block)?
    fn parse_if(&mut self) -> ParseResult<If> {
        let keyword = self.expect(|t| matches!(t, Token::If(_)), "'if'")?;
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;
        let else_block = if matches!(self.peek(), Some(Token::Else(_))) {
            self.next();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(If {
            condition: Box::new(condition),
            then_block,
            else_block,
            position: keyword.pos(),
        })
    }

    /// match := "match" expression "{" case* "}"
    fn parse_match(&mut self) -> ParseResult<Match> {
        let keyword = self.expect(|t| matches!(t, Token::KwMatch(_)), "'match'")?;
        let subject = self.parse_expression()?;
        self.expect(|t| matches!(t, Token::LBrace(_)), "'{'")?;
        let mut cases = Vec::new();
        while matches!(self.peek(), Some(Token::Case(_))) {
            cases.push(self.parse_case()?);
        }
        self.expect(|t| matches!(t, Token::RBrace(_)), "'}'")?;
        Ok(Match {
            subject: Box::new(subject),
            cases,
            position: keyword.pos(),
        })
    }

    /// case := "case" pattern ":" expression*
    ///
    /// The body runs until the next `case` or the closing brace.
    fn parse_case(&mut self) -> ParseResult<Case> {
        let keyword = self.expect(|t| matches!(t, Token::Case(_)), "'case'")?;
        let (name, position) = self.ident()?;
        let pattern = self.parse_pattern_tail(name, position)?;
        self.expect(|t| matches!(t, Token::Colon(_)), "':'")?;
        let mut nodes = Vec::new();
        while !matches!(self.peek(), Some(Token::Case(_)) | Some(Token::RBrace(_)) | None) {
            nodes.push(self.parse_expression()?);
        }
        Ok(Case {
            pattern,
            body: Block {
                nodes,
                position: keyword.pos(),
            },
            position: keyword.pos(),
        })
    }

    /// pattern := constructor ("(" identifier ("," identifier)* ")")?
    fn parse_pattern_tail(&mut self, constructor: String, position: Span) -> ParseResult<Pattern> {
        let mut bindings = Vec::new();
        if matches!(self.peek(), Some(Token::LParen(_))) {
            self.next();
            loop {
                let (name, span) = self.ident()?;
                bindings.push(Identifier {
                    name,
                    position: span,
                });
                if matches!(self.peek(), Some(Token::Comma(_))) {
                    self.next();
                } else {
                    break;
                }
            }
            self.expect(|t| matches!(t, Token::RParen(_)), "')'")?;
        }
        Ok(Pattern {
            constructor,
            bindings,
            tag: None,
            position,
        })
    }

    /// generics := "<" identifier ("," identifier)* ">"
    fn parse_generics(&mut self) -> ParseResult<Vec<String>> {
        let mut generics = Vec::new();
        if matches!(self.peek(), Some(Token::LAngle(_))) {
            self.next();
            loop {
                let (name, _) = self.ident()?;
                generics.push(name);
                if matches!(self.peek(), Some(Token::Comma(_))) {
                    self.next();
                } else {
                    break;
                }
            }
            self.expect(|t| matches!(t, Token::RAngle(_)), "'>'")?;
        }
        Ok(generics)
    }

    /// type := "(" type ("," type)* ")" "->" type
    ///       | identifier ("<" type ("," type)* ">")?
    fn parse_type(&mut self) -> ParseResult<TypeSpec> {
        if let Some(Token::LParen(_)) = self.peek() {
            let open = self.next().unwrap_or_else(|| unreachable!());
            let mut params = Vec::new();
            if !matches!(self.peek(), Some(Token::RParen(_))) {
                loop {
                    params.push(self.parse_type()?);
                    if matches!(self.peek(), Some(Token::Comma(_))) {
                        self.next();
                    } else {
                        break;
                    }
                }
            }
            self.expect(|t| matches!(t, Token::RParen(_)), "')'")?;
            self.expect(|t| matches!(t, Token::Arrow(_)), "'->'")?;
            let returns = self.parse_type()?;
            return Ok(TypeSpec::Function(FunctionTypeSpec {
                generics: Vec::new(),
                params,
                returns: Box::new(returns),
                position: open.pos(),
            }));
        }

        let (name, position) = self.ident()?;
        if matches!(self.peek(), Some(Token::LAngle(_))) {
            self.next();
            let mut params = Vec::new();
            loop {
                params.push(self.parse_type()?);
                if matches!(self.peek(), Some(Token::Comma(_))) {
                    self.next();
                } else {
                    break;
                }
            }
            self.expect(|t| matches!(t, Token::RAngle(_)), "'>'")?;
            return Ok(TypeSpec::Data(DataTypeSpec {
                name,
                params,
                position,
            }));
        }
        Ok(TypeSpec::Basic(BasicTypeSpec { name, position }))
    }

    /// enum := "enum" Name generics? "{" ctor_decl* "}"
    /// ctor_decl := Name ("(" type ("," type)* ")")?
    fn parse_enum(&mut self) -> ParseResult<EnumDecl> {
        let keyword = self.expect(|t| matches!(t, Token::Enum(_)), "'enum'")?;
        let (name, _) = self.ident()?;
        let generics = self.parse_generics()?;
        self.expect(|t| matches!(t, Token::LBrace(_)), "'{'")?;
        let mut constructors = Vec::new();
        while !matches!(self.peek(), Some(Token::RBrace(_))) {
            let (ctor_name, ctor_position) = self.ident()?;
            let mut params = Vec::new();
            if matches!(self.peek(), Some(Token::LParen(_))) {
                self.next();
                loop {
                    params.push(self.parse_type()?);
                    if matches!(self.peek(), Some(Token::Comma(_))) {
                        self.next();
                    } else {
                        break;
                    }
                }
                self.expect(|t| matches!(t, Token::RParen(_)), "')'")?;
            }
            self.constructors.insert(ctor_name.clone());
            constructors.push(EnumConstructor {
                name: ctor_name,
                params,
                position: ctor_position,
            });
        }
        self.expect(|t| matches!(t, Token::RBrace(_)), "'}'")?;
        Ok(EnumDecl {
            name,
            generics,
            constructors,
            position: keyword.pos(),
        })
    }

    /// interface := "interface" Name "<" identifier ">" "{" (prototype | function)* "}"
    fn parse_interface(&mut self) -> ParseResult<InterfaceDecl> {
        let keyword = self.expect(|t| matches!(t, Token::Interface(_)), "'interface'")?;
        let (name, _) = self.ident()?;
        self.expect(|t| matches!(t, Token::LAngle(_)), "'<'")?;
        let (generic, _) = self.ident()?;
        self.expect(|t| matches!(t, Token::RAngle(_)), "'>'")?;
        let open = self.expect(|t| matches!(t, Token::LBrace(_)), "'{'")?;

        let mut virtuals = Vec::new();
        let mut concretes = Vec::new();
        let mut nodes = Vec::new();
        while !matches!(self.peek(), Some(Token::RBrace(_))) {
            match self.peek() {
                Some(Token::Virtual(_)) => {
                    let proto = self.parse_prototype()?;
                    virtuals.push(proto.name.clone());
                    nodes.push(Node::Prototype(proto));
                }
                Some(Token::KwFn(_)) => {
                    let function = self.parse_function()?;
                    concretes.push(function.name.clone());
                    nodes.push(Node::Function(function));
                }
                _ => return Err(self.error_here("expected 'virtual' or 'fn' in interface block")),
            }
        }
        self.expect(|t| matches!(t, Token::RBrace(_)), "'}'")?;
        Ok(InterfaceDecl {
            name,
            generic,
            virtuals,
            concretes,
            block: Block {
                nodes,
                position: open.pos(),
            },
            position: keyword.pos(),
        })
    }

    /// implementation := "impl" Name "<" type ">" "{" (function | prototype)* "}"
    fn parse_implementation(&mut self) -> ParseResult<ImplementationDecl> {
        let keyword = self.expect(|t| matches!(t, Token::Impl(_)), "'impl'")?;
        let (interface_name, _) = self.ident()?;
        self.expect(|t| matches!(t, Token::LAngle(_)), "'<'")?;
        let target = self.parse_type()?;
        self.expect(|t| matches!(t, Token::RAngle(_)), "'>'")?;
        let open = self.expect(|t| matches!(t, Token::LBrace(_)), "'{'")?;

        let mut nodes = Vec::new();
        while !matches!(self.peek(), Some(Token::RBrace(_))) {
            match self.peek() {
                Some(Token::KwFn(_)) => nodes.push(Node::Function(self.parse_function()?)),
                Some(Token::Virtual(_)) => nodes.push(Node::Prototype(self.parse_prototype()?)),
                _ => return Err(self.error_here("expected 'fn' in implementation block")),
            }
        }
        self.expect(|t| matches!(t, Token::RBrace(_)), "'}'")?;
        Ok(ImplementationDecl {
            interface_name,
            target,
            block: Block {
                nodes,
                position: open.pos(),
            },
            position: keyword.pos(),
        })
    }

    /// prototype := "virtual" identifier "(" type ("," type)* ")" "->" type
    fn parse_prototype(&mut self) -> ParseResult<Prototype> {
        let keyword = self.expect(|t| matches!(t, Token::Virtual(_)), "'virtual'")?;
        let (name, position) = self.ident()?;
        self.expect(|t| matches!(t, Token::LParen(_)), "'('")?;
        let mut params = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen(_))) {
            loop {
                params.push(self.parse_type()?);
                if matches!(self.peek(), Some(Token::Comma(_))) {
                    self.next();
                } else {
                    break;
                }
            }
        }
        self.expect(|t| matches!(t, Token::RParen(_)), "')'")?;
        self.expect(|t| matches!(t, Token::Arrow(_)), "'->'")?;
        let returns = self.parse_type()?;
        Ok(Prototype {
            name,
            is_virtual: true,
            type_spec: FunctionTypeSpec {
                generics: Vec::new(),
                params,
                returns: Box::new(returns),
                position,
            },
            position: keyword.pos(),
        })
    }

    /// function := "fn" identifier generics? "(" params? ")" ("->" type)? block
    /// params := identifier (":" type)? ("," identifier (":" type)?)*
    ///
    /// Either every parameter is annotated (the function carries its own
    /// type) or none is (the type comes from a prior prototype).
    fn parse_function(&mut self) -> ParseResult<Function> {
        let keyword = self.expect(|t| matches!(t, Token::KwFn(_)), "'fn'")?;
        let (name, position) = self.ident()?;
        let generics = self.parse_generics()?;
        self.expect(|t| matches!(t, Token::LParen(_)), "'('")?;

        let mut parameters = Vec::new();
        let mut annotations = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen(_))) {
            loop {
                let (param_name, param_position) = self.ident()?;
                parameters.push(FunctionParameter {
                    name: param_name,
                    position: param_position,
                });
                if matches!(self.peek(), Some(Token::Colon(_))) {
                    self.next();
                    annotations.push(self.parse_type()?);
                }
                if matches!(self.peek(), Some(Token::Comma(_))) {
                    self.next();
                } else {
                    break;
                }
            }
        }
        self.expect(|t| matches!(t, Token::RParen(_)), "')'")?;

        if !annotations.is_empty() && annotations.len() != parameters.len() {
            return Err(ParseError::new(format!(
                "function '{}' mixes annotated and unannotated parameters",
                name
            ))
            .at(position));
        }

        let returns = if matches!(self.peek(), Some(Token::Arrow(_))) {
            self.next();
            Some(self.parse_type()?)
        } else {
            None
        };

        let type_spec = if !parameters.is_empty() && annotations.is_empty() {
            // Unannotated parameters: the type comes from a prototype
            if returns.is_some() || !generics.is_empty() {
                return Err(ParseError::new(format!(
                    "function '{}' declares a signature but its parameters are unannotated",
                    name
                ))
                .at(position));
            }
            None
        } else {
            let returns = returns.unwrap_or(TypeSpec::Basic(BasicTypeSpec {
                name: "void".to_string(),
                position: position.clone(),
            }));
            Some(FunctionTypeSpec {
                generics,
                params: annotations,
                returns: Box::new(returns),
                position: position.clone(),
            })
        };

        let body = self.parse_block()?;
        Ok(Function {
            name,
            type_spec,
            parameters,
            body,
            position: keyword.pos(),
        })
    }
}

/// Strip the surrounding quotes from a string literal and resolve the
/// common escapes.
fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
