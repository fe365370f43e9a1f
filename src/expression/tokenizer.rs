use crate::error::LexError;
use crate::expression::{
    is_valid_variable_name, Registry, Token, TokenKind, ARG_SEPARATOR, CALL_CLOSE, CALL_OPEN,
};
use log::trace;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./expression/literal.pest"]
struct LiteralParser;

/// Splits an expression into tokens.
///
/// Named tokens are matched greedily: the candidate runs up to the next
/// whitespace and is shortened one character at a time until it is a known
/// function, operator, bracket, or a valid variable name. Candidates longer
/// than every registered name can only be variables, so those are found by
/// a single scan instead.
pub fn tokenize(registry: &Registry, expression: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut position = 0;

    while let Some(symbol) = expression[position..].chars().next() {
        let rest = &expression[position..];
        if symbol.is_whitespace() {
            position += symbol.len_utf8();
            continue;
        }

        let token = if symbol == ARG_SEPARATOR {
            Token::new(TokenKind::ArgSeparator, ARG_SEPARATOR.to_string())
        } else if symbol.is_ascii_digit() {
            scan_literal(rest, position)?
        } else {
            scan_named(registry, rest, position)?
        };

        position += token.text().len();
        tokens.push(token);
    }

    trace!("Tokenized {:?} into {:?}", expression, tokens);
    Ok(tokens)
}

fn scan_literal(rest: &str, position: usize) -> Result<Token, LexError> {
    let malformed = || LexError::MalformedLiteral {
        position,
        text: word(rest).to_string(),
    };

    let pair = LiteralParser::parse(Rule::number, rest)
        .map_err(|_| malformed())?
        .next()
        .ok_or_else(malformed)?;
    let text = pair.as_str();

    let value: f64 = text.parse().map_err(|_| malformed())?;
    if !value.is_finite() {
        return Err(malformed());
    }
    Ok(Token::new(TokenKind::Literal, text))
}

fn scan_named(registry: &Registry, rest: &str, position: usize) -> Result<Token, LexError> {
    // Call symbols are brackets even in an empty registry.
    let limit = registry.longest_name().max(1);

    let variable_end = variable_run(rest);
    if variable_end > limit {
        return Ok(Token::new(TokenKind::Variable, &rest[..variable_end]));
    }

    let candidate_ends: Vec<usize> = rest
        .char_indices()
        .take_while(|(i, c)| *i < limit && !c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .filter(|end| *end <= limit)
        .collect();
    for end in candidate_ends.into_iter().rev() {
        let candidate = &rest[..end];
        if let Some(kind) = classify(registry, candidate) {
            return Ok(Token::new(kind, candidate));
        }
    }

    Err(LexError::UnknownIdentifier {
        position,
        text: word(rest).to_string(),
    })
}

/// Byte length of the longest valid variable name at the start of `rest`.
fn variable_run(rest: &str) -> usize {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, first)) if first.is_ascii_alphabetic() => chars
            .find(|(_, c)| !c.is_ascii_alphanumeric())
            .map_or(rest.len(), |(i, _)| i),
        _ => 0,
    }
}

fn classify(registry: &Registry, candidate: &str) -> Option<TokenKind> {
    if registry.is_function(candidate) {
        Some(TokenKind::Function)
    } else if registry.is_operator(candidate) {
        Some(TokenKind::Operator)
    } else if is_call_symbol(candidate) || registry.is_bracket(candidate) {
        Some(TokenKind::Bracket)
    } else if is_valid_variable_name(candidate) {
        Some(TokenKind::Variable)
    } else {
        None
    }
}

fn is_call_symbol(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(CALL_OPEN | CALL_CLOSE)) && chars.next().is_none()
}

/// The input up to the next whitespace.
fn word(rest: &str) -> &str {
    rest.find(char::is_whitespace)
        .map_or(rest, |end| &rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        functions::register_functions(&mut registry).unwrap();
        registry
    }

    fn kinds_and_texts(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
        tokens.iter().map(|t| (t.kind(), t.text())).collect()
    }

    #[test]
    fn test_adjacent_tokens_without_whitespace() {
        let tokens = tokenize(&registry(), "a+1").unwrap();
        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Variable, "a"),
                (TokenKind::Operator, "+"),
                (TokenKind::Literal, "1"),
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        let tokens = tokenize(&registry(), "x++ + ++y").unwrap();
        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Variable, "x"),
                (TokenKind::Operator, "++"),
                (TokenKind::Operator, "+"),
                (TokenKind::Operator, "++"),
                (TokenKind::Variable, "y"),
            ]
        );
    }

    #[test]
    fn test_function_call() {
        let tokens = tokenize(&registry(), "max(1, 2.5e3)").unwrap();
        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Function, "max"),
                (TokenKind::Bracket, "("),
                (TokenKind::Literal, "1"),
                (TokenKind::ArgSeparator, ","),
                (TokenKind::Literal, "2.5e3"),
                (TokenKind::Bracket, ")"),
            ]
        );
    }

    #[test]
    fn test_call_symbols_are_brackets_without_registration() {
        let empty = Registry::new();
        let tokens = tokenize(&empty, "(x)").unwrap();
        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Bracket, "("),
                (TokenKind::Variable, "x"),
                (TokenKind::Bracket, ")"),
            ]
        );
    }

    #[test]
    fn test_function_prefix_of_variable() {
        // "maximum" is a valid variable name, so it is not split after "max".
        let tokens = tokenize(&registry(), "maximum+max").unwrap();
        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Variable, "maximum"),
                (TokenKind::Operator, "+"),
                (TokenKind::Function, "max"),
            ]
        );
    }

    #[test]
    fn test_literal_forms() {
        let registry = registry();
        for (input, literal) in [
            ("42", "42"),
            ("3.25", "3.25"),
            ("1.", "1."),
            ("6.02e23", "6.02e23"),
            ("1E-3", "1E-3"),
            ("7e+2", "7e+2"),
        ] {
            let tokens = tokenize(&registry, input).unwrap();
            assert_eq!(kinds_and_texts(&tokens), vec![(TokenKind::Literal, literal)]);
        }

        // An exponent marker without digits is not part of the literal.
        let tokens = tokenize(&registry, "2e").unwrap();
        assert_eq!(
            kinds_and_texts(&tokens),
            vec![(TokenKind::Literal, "2"), (TokenKind::Variable, "e")]
        );
    }

    #[test]
    fn test_literal_round_trip() {
        let registry = registry();
        let mut rng = rand::rng();

        for _ in 0..500 {
            let value: f64 = rng.random_range(0.0..1.0e12);
            for text in [format!("{}", value), format!("{:e}", value)] {
                let tokens = tokenize(&registry, &text).unwrap();
                assert_eq!(tokens.len(), 1, "{text}");
                assert_eq!(tokens[0].kind(), TokenKind::Literal);
                assert_eq!(tokens[0].text().parse::<f64>().unwrap(), value, "{text}");
            }
        }
    }

    #[test]
    fn test_overflowing_literal() {
        assert_eq!(
            tokenize(&registry(), "1e999 + 1"),
            Err(LexError::MalformedLiteral {
                position: 0,
                text: "1e999".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_identifier() {
        assert_eq!(
            tokenize(&registry(), "price > 100 @ volume"),
            Err(LexError::UnknownIdentifier {
                position: 6,
                text: ">".to_string()
            })
        );
        assert_eq!(
            tokenize(&registry(), "1 + _x"),
            Err(LexError::UnknownIdentifier {
                position: 4,
                text: "_x".to_string()
            })
        );
    }

    #[test]
    fn test_long_input_without_whitespace() {
        let registry = registry();
        let expression = format!("{}1", "1+".repeat(20_000));

        let tokens = tokenize(&registry, &expression).unwrap();
        assert_eq!(tokens.len(), 40_001);
        assert_eq!(tokens[1].kind(), TokenKind::Operator);
        assert_eq!(tokens[40_000].text(), "1");

        let name = "v".repeat(10_000);
        let tokens = tokenize(&registry, &format!("{name}+max(1,2)")).unwrap();
        assert_eq!(tokens[0], Token::new(TokenKind::Variable, name.as_str()));
        assert_eq!(tokens[2], Token::new(TokenKind::Function, "max"));
    }

    #[test]
    fn test_names_longer_than_any_registered_name() {
        let registry = registry();
        let tokens = tokenize(&registry, "logarithm*log(2,x)").unwrap();
        assert_eq!(
            kinds_and_texts(&tokens)[..3].to_vec(),
            vec![
                (TokenKind::Variable, "logarithm"),
                (TokenKind::Operator, "*"),
                (TokenKind::Function, "log"),
            ]
        );

        let empty = Registry::new();
        let tokens = tokenize(&empty, "(ab)").unwrap();
        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Bracket, "("),
                (TokenKind::Variable, "ab"),
                (TokenKind::Bracket, ")"),
            ]
        );
    }

    #[test]
    fn test_whitespace_and_empty() {
        let registry = registry();
        assert!(tokenize(&registry, "").unwrap().is_empty());
        assert!(tokenize(&registry, " \t\n ").unwrap().is_empty());

        let tokens = tokenize(&registry, "  1\t*\n2  ").unwrap();
        assert_eq!(tokens.len(), 3);
    }
}
