use thiserror::Error;

/// Which namespace a name was validated against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NameKind {
    Function,
    Operator,
    Bracket,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            NameKind::Function => "function",
            NameKind::Operator => "operator",
            NameKind::Bracket => "bracket",
        };
        f.write_str(kind)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("\"{name}\" - invalid name for {kind}")]
    InvalidName { kind: NameKind, name: String },

    #[error("Trying to override a function, operator or bracket {name}")]
    NameCollision { name: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unknown identifier '{text}' at position {position}")]
    UnknownIdentifier { position: usize, text: String },

    /// `position` is a byte offset when raised by the tokenizer and a token
    /// index when raised while evaluating a prebuilt token stream.
    #[error("Malformed numeric literal '{text}' at position {position}")]
    MalformedLiteral { position: usize, text: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Unknown operator {0}")]
    UnknownOperator(String),

    #[error("Function call expected after {0}")]
    MissingCall(String),

    #[error("Unexpected bracket {0}")]
    MismatchedBracket(String),

    #[error("Unclosed bracket {0}")]
    UnbalancedBrackets(String),

    #[error("Expected ) to close call of {0}")]
    IncompleteCall(String),

    #[error("Unexpected ,")]
    UnexpectedSeparator,

    #[error("Unexpected number of arguments for {operation}: expected {expected}, found {found}")]
    InsufficientOperands {
        operation: String,
        expected: usize,
        found: usize,
    },

    #[error("Impossible to assign a value to a non-variable with {0}")]
    NotAssignable(String),

    #[error("Cannot apply {0} to a constant")]
    NotAVariable(String),

    #[error("Variable {0} not init")]
    UninitializedVariable(String),

    #[error("{operation}: {message}")]
    Domain { operation: String, message: String },

    #[error("Error expression")]
    MalformedExpression,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Invalid variable name {0}")]
    InvalidName(String),
}

/// Failure of the one-shot [`crate::evaluate_expression`] helper, which
/// builds its registry on every call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
