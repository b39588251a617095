//! # Type Error Definitions
//!
//! A single error kind covers the whole checking pass; the conditions
//! are distinguished by message. Every error carries the source span it
//! was raised at, and the `Display` implementation renders the message
//! with a source excerpt when the span has source text attached.
//!
//! The first error is fatal: the checker propagates it straight to the
//! driver and no recovery is attempted.

use std::fmt;

use lachs::Span;

/// Type error raised by the type-of pass or one of its helpers.
#[derive(Debug, Clone)]
pub enum TypeError {
    /// Reference to a name with no binding in scope
    UnknownIdentifier { name: String, span: Span },

    /// A type annotation names an undeclared type
    UnknownType { name: String, span: Span },

    /// An `impl` block names an undeclared interface
    UnknownInterface { name: String, span: Span },

    /// A pattern names something that is not a constructor
    UnknownConstructorPattern { name: String, span: Span },

    /// A constructor application names something that is not a constructor
    UndefinedConstructor { name: String, span: Span },

    /// Call arity does not match the callee
    WrongArgumentCount { span: Span },

    /// An argument's type is not accepted by the parameter
    ArgumentMismatch {
        expected: String,
        found: String,
        index: usize,
        function: String,
        span: Span,
    },

    /// Call target is not a function
    NotAFunction { span: Span },

    /// A binary operand is not an `int`
    BinaryOperand { found: String, span: Span },

    /// List elements with incompatible types
    MixedList {
        first: String,
        second: String,
        span: Span,
    },

    /// `match` with no cases
    EmptyMatch { span: Span },

    /// Match cases with incompatible types
    MixedMatch {
        first: String,
        second: String,
        span: Span,
    },

    /// Function body type does not satisfy the declared return type
    InvalidReturnType {
        expected: String,
        found: String,
        span: Span,
    },

    /// Pattern constructor does not belong to the matched value's type
    PatternMismatch {
        value: String,
        constructor: String,
        span: Span,
    },

    /// Pattern binds a different number of names than the constructor has fields
    PatternBindingCount { constructor: String, span: Span },

    /// Function parameter list does not match its type's arity
    ParameterCount { function: String, span: Span },

    /// An `impl` defines a method the interface does not declare
    NotInInterface {
        function: String,
        implementation: String,
        span: Span,
    },

    /// An `impl` left virtual methods unimplemented
    MissingVirtuals {
        implementation: String,
        missing: Vec<String>,
        span: Span,
    },

    /// `if` and `else` branches with incompatible types
    BranchMismatch { span: Span },
}

impl TypeError {
    pub fn unknown_identifier(name: impl Into<String>, span: Span) -> Self {
        TypeError::UnknownIdentifier {
            name: name.into(),
            span,
        }
    }

    pub fn unknown_type(name: impl Into<String>, span: Span) -> Self {
        TypeError::UnknownType {
            name: name.into(),
            span,
        }
    }

    pub fn unknown_interface(name: impl Into<String>, span: Span) -> Self {
        TypeError::UnknownInterface {
            name: name.into(),
            span,
        }
    }

    pub fn unknown_constructor_pattern(name: impl Into<String>, span: Span) -> Self {
        TypeError::UnknownConstructorPattern {
            name: name.into(),
            span,
        }
    }

    pub fn undefined_constructor(name: impl Into<String>, span: Span) -> Self {
        TypeError::UndefinedConstructor {
            name: name.into(),
            span,
        }
    }

    pub fn wrong_argument_count(span: Span) -> Self {
        TypeError::WrongArgumentCount { span }
    }

    pub fn argument_mismatch(
        expected: impl ToString,
        found: impl ToString,
        index: usize,
        function: impl Into<String>,
        span: Span,
    ) -> Self {
        TypeError::ArgumentMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
            index,
            function: function.into(),
            span,
        }
    }

    pub fn not_a_function(span: Span) -> Self {
        TypeError::NotAFunction { span }
    }

    pub fn binary_operand(found: impl ToString, span: Span) -> Self {
        TypeError::BinaryOperand {
            found: found.to_string(),
            span,
        }
    }

    pub fn mixed_list(first: impl ToString, second: impl ToString, span: Span) -> Self {
        TypeError::MixedList {
            first: first.to_string(),
            second: second.to_string(),
            span,
        }
    }

    pub fn empty_match(span: Span) -> Self {
        TypeError::EmptyMatch { span }
    }

    pub fn mixed_match(first: impl ToString, second: impl ToString, span: Span) -> Self {
        TypeError::MixedMatch {
            first: first.to_string(),
            second: second.to_string(),
            span,
        }
    }

    pub fn invalid_return_type(
        expected: impl ToString,
        found: impl ToString,
        span: Span,
    ) -> Self {
        TypeError::InvalidReturnType {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn pattern_mismatch(
        value: impl ToString,
        constructor: impl Into<String>,
        span: Span,
    ) -> Self {
        TypeError::PatternMismatch {
            value: value.to_string(),
            constructor: constructor.into(),
            span,
        }
    }

    pub fn pattern_binding_count(constructor: impl Into<String>, span: Span) -> Self {
        TypeError::PatternBindingCount {
            constructor: constructor.into(),
            span,
        }
    }

    pub fn parameter_count(function: impl Into<String>, span: Span) -> Self {
        TypeError::ParameterCount {
            function: function.into(),
            span,
        }
    }

    pub fn not_in_interface(
        function: impl Into<String>,
        implementation: impl Into<String>,
        span: Span,
    ) -> Self {
        TypeError::NotInInterface {
            function: function.into(),
            implementation: implementation.into(),
            span,
        }
    }

    pub fn missing_virtuals(
        implementation: impl Into<String>,
        missing: Vec<String>,
        span: Span,
    ) -> Self {
        TypeError::MissingVirtuals {
            implementation: implementation.into(),
            missing,
            span,
        }
    }

    pub fn branch_mismatch(span: Span) -> Self {
        TypeError::BranchMismatch { span }
    }

    /// The bare diagnostic message, without location rendering.
    pub fn message(&self) -> String {
        match self {
            TypeError::UnknownIdentifier { name, .. } => {
                format!("Unknown identifier: `{}`", name)
            }
            TypeError::UnknownType { name, .. } => format!("Unknown type: `{}`", name),
            TypeError::UnknownInterface { name, .. } => {
                format!("Unknown interface: `{}`", name)
            }
            TypeError::UnknownConstructorPattern { name, .. } => {
                format!("Unknown constructor `{}` on pattern match", name)
            }
            TypeError::UndefinedConstructor { name, .. } => {
                format!("Undefined constructor: `{}`", name)
            }
            TypeError::WrongArgumentCount { .. } => {
                "Wrong number of arguments for function call".to_string()
            }
            TypeError::ArgumentMismatch {
                expected,
                found,
                index,
                function,
                ..
            } => format!(
                "Expected `{}` but got `{}` on arg #{} for function `{}`",
                expected, found, index, function
            ),
            TypeError::NotAFunction { .. } => {
                "Can't find type information for function call".to_string()
            }
            TypeError::BinaryOperand { found, .. } => {
                format!("Binary operations only accept `int`, but found `{}`", found)
            }
            TypeError::MixedList { first, second, .. } => format!(
                "Lists can't have mixed types: `{}` and `{}`",
                first, second
            ),
            TypeError::EmptyMatch { .. } => {
                "Cannot have `match` expression with no cases".to_string()
            }
            TypeError::MixedMatch { first, second, .. } => format!(
                "Match can't have mixed types on its cases: `{}` and `{}`",
                first, second
            ),
            TypeError::InvalidReturnType {
                expected, found, ..
            } => format!(
                "Invalid return type for function: expected `{}` but got `{}`",
                expected, found
            ),
            TypeError::PatternMismatch {
                value, constructor, ..
            } => format!(
                "Trying to pattern match value of type `{}` with constructor `{}`",
                value, constructor
            ),
            TypeError::PatternBindingCount { constructor, .. } => format!(
                "Wrong number of bindings for constructor `{}` on pattern match",
                constructor
            ),
            TypeError::ParameterCount { function, .. } => {
                format!("Wrong number of parameters for function `{}`", function)
            }
            TypeError::NotInInterface {
                function,
                implementation,
                ..
            } => format!(
                "Defining function `{}` inside implementation `{}`, but it's not part of the interface",
                function, implementation
            ),
            TypeError::MissingVirtuals {
                implementation,
                missing,
                ..
            } => {
                let mut msg = format!(
                    "Implementation `{}` does not implement the following virtual functions:",
                    implementation
                );
                for (i, name) in missing.iter().enumerate() {
                    msg.push_str(&format!(" {}) {}", i + 1, name));
                }
                msg
            }
            TypeError::BranchMismatch { .. } => {
                "`if` and `else` branches evaluate to different types".to_string()
            }
        }
    }

    /// The source span this error was raised at.
    pub fn span(&self) -> &Span {
        match self {
            TypeError::UnknownIdentifier { span, .. }
            | TypeError::UnknownType { span, .. }
            | TypeError::UnknownInterface { span, .. }
            | TypeError::UnknownConstructorPattern { span, .. }
            | TypeError::UndefinedConstructor { span, .. }
            | TypeError::WrongArgumentCount { span }
            | TypeError::ArgumentMismatch { span, .. }
            | TypeError::NotAFunction { span }
            | TypeError::BinaryOperand { span, .. }
            | TypeError::MixedList { span, .. }
            | TypeError::EmptyMatch { span }
            | TypeError::MixedMatch { span, .. }
            | TypeError::InvalidReturnType { span, .. }
            | TypeError::PatternMismatch { span, .. }
            | TypeError::PatternBindingCount { span, .. }
            | TypeError::ParameterCount { span, .. }
            | TypeError::NotInInterface { span, .. }
            | TypeError::MissingVirtuals { span, .. }
            | TypeError::BranchMismatch { span } => span,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = self.message();
        let span = self.span();
        if span.source.is_empty() {
            write!(f, "Type Error: {}", msg)
        } else {
            write!(f, "{}", span.to_string(&msg))
        }
    }
}

impl std::error::Error for TypeError {}
