//! Runtime values for the Verve VM.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Value>),
    /// A constructor cell: the tag identifying the enum case plus its
    /// fields
    Data { tag: usize, fields: Vec<Value> },
    Unit,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Data { tag, fields } => {
                write!(f, "<data tag={}", tag)?;
                for field in fields {
                    write!(f, " {}", field)?;
                }
                write!(f, ">")
            }
            Value::Unit => write!(f, "<unit>"),
        }
    }
}
