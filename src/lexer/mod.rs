use lachs::Span;

#[lachs::token]
pub enum Token {
    #[terminal("fn")]
    KwFn,
    #[terminal("let")]
    Let,
    #[terminal("if")]
    If,
    #[terminal("else")]
    Else,
    #[terminal("match")]
    KwMatch,
    #[terminal("case")]
    Case,
    #[terminal("enum")]
    Enum,
    #[terminal("interface")]
    Interface,
    #[terminal("impl")]
    Impl,
    #[terminal("virtual")]
    Virtual,
    #[literal("[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[literal(r"[0-9]+\.[0-9]+")]
    Float,
    #[literal("[0-9]+")]
    Integer,
    #[literal(r#""([^"\\]|\\.)*""#)]
    StringLiteral,
    #[terminal("->")]
    Arrow,
    #[terminal("=")]
    Equals,
    #[terminal(":")]
    Colon,
    #[terminal(",")]
    Comma,
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal("{")]
    LBrace,
    #[terminal("}")]
    RBrace,
    #[terminal("[")]
    LBracket,
    #[terminal("]")]
    RBracket,
    #[terminal("<")]
    LAngle,
    #[terminal(">")]
    RAngle,
    #[terminal("!")]
    Bang,
    #[terminal("+")]
    Plus,
    #[terminal("-")]
    Minus,
    #[terminal("*")]
    Star,
    #[terminal("/")]
    Slash,
}

impl Token {
    pub fn pos(&self) -> Span {
        match self {
            Token::KwFn(inner) => inner.position.clone(),
            Token::Let(inner) => inner.position.clone(),
            Token::If(inner) => inner.position.clone(),
            Token::Else(inner) => inner.position.clone(),
            Token::KwMatch(inner) => inner.position.clone(),
            Token::Case(inner) => inner.position.clone(),
            Token::Enum(inner) => inner.position.clone(),
            Token::Interface(inner) => inner.position.clone(),
            Token::Impl(inner) => inner.position.clone(),
            Token::Virtual(inner) => inner.position.clone(),
            Token::Ident(inner) => inner.position.clone(),
            Token::Float(inner) => inner.position.clone(),
            Token::Integer(inner) => inner.position.clone(),
            Token::StringLiteral(inner) => inner.position.clone(),
            Token::Arrow(inner) => inner.position.clone(),
            Token::Equals(inner) => inner.position.clone(),
            Token::Colon(inner) => inner.position.clone(),
            Token::Comma(inner) => inner.position.clone(),
            Token::LParen(inner) => inner.position.clone(),
            Token::RParen(inner) => inner.position.clone(),
            Token::LBrace(inner) => inner.position.clone(),
            Token::RBrace(inner) => inner.position.clone(),
            Token::LBracket(inner) => inner.position.clone(),
            Token::RBracket(inner) => inner.position.clone(),
            Token::LAngle(inner) => inner.position.clone(),
            Token::RAngle(inner) => inner.position.clone(),
            Token::Bang(inner) => inner.position.clone(),
            Token::Plus(inner) => inner.position.clone(),
            Token::Minus(inner) => inner.position.clone(),
            Token::Star(inner) => inner.position.clone(),
            Token::Slash(inner) => inner.position.clone(),
        }
    }

    /// Returns a human-readable description of the token
    pub fn describe(&self) -> String {
        match self {
            Token::KwFn(_) => "'fn'".to_string(),
            Token::Let(_) => "'let'".to_string(),
            Token::If(_) => "'if'".to_string(),
            Token::Else(_) => "'else'".to_string(),
            Token::KwMatch(_) => "'match'".to_string(),
            Token::Case(_) => "'case'".to_string(),
            Token::Enum(_) => "'enum'".to_string(),
            Token::Interface(_) => "'interface'".to_string(),
            Token::Impl(_) => "'impl'".to_string(),
            Token::Virtual(_) => "'virtual'".to_string(),
            Token::Ident(inner) => format!("identifier '{}'", inner.value),
            Token::Float(inner) => format!("float '{}'", inner.value),
            Token::Integer(inner) => format!("integer '{}'", inner.value),
            Token::StringLiteral(inner) => format!("string {}", inner.value),
            Token::Arrow(_) => "'->'".to_string(),
            Token::Equals(_) => "'='".to_string(),
            Token::Colon(_) => "':'".to_string(),
            Token::Comma(_) => "','".to_string(),
            Token::LParen(_) => "'('".to_string(),
            Token::RParen(_) => "')'".to_string(),
            Token::LBrace(_) => "'{'".to_string(),
            Token::RBrace(_) => "'}'".to_string(),
            Token::LBracket(_) => "'['".to_string(),
            Token::RBracket(_) => "']'".to_string(),
            Token::LAngle(_) => "'<'".to_string(),
            Token::RAngle(_) => "'>'".to_string(),
            Token::Bang(_) => "'!'".to_string(),
            Token::Plus(_) => "'+'".to_string(),
            Token::Minus(_) => "'-'".to_string(),
            Token::Star(_) => "'*'".to_string(),
            Token::Slash(_) => "'/'".to_string(),
        }
    }
}
