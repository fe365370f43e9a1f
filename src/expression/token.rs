/// Argument separator in a function call.
pub const ARG_SEPARATOR: char = ',';

/// Symbol directly after a function name that opens its argument list.
pub const CALL_OPEN: char = '(';

/// Symbol that closes a function's argument list.
pub const CALL_CLOSE: char = ')';

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    ArgSeparator,
    Literal,
    Function,
    Operator,
    Bracket,
    Variable,
}

/// A lexeme of the input together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn is_char(&self, symbol: char) -> bool {
        let mut chars = self.text.chars();
        chars.next() == Some(symbol) && chars.next().is_none()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
