use crate::error::{NameKind, RegistryError};
use crate::expression::{Operation, OperationKind, ARG_SEPARATOR, CALL_CLOSE, CALL_OPEN};
use log::{debug, warn};
use std::collections::HashMap;

fn is_reserved(symbol: char) -> bool {
    symbol == ARG_SEPARATOR || symbol == CALL_OPEN || symbol == CALL_CLOSE
}

fn is_word_start(symbol: char) -> bool {
    symbol.is_ascii_alphabetic() && !is_reserved(symbol)
}

fn is_word_part(symbol: char) -> bool {
    symbol.is_ascii_alphanumeric() && !is_reserved(symbol)
}

fn is_symbol_start(symbol: char) -> bool {
    (symbol.is_ascii_alphabetic() || symbol.is_ascii_punctuation()) && !is_reserved(symbol)
}

fn is_symbol_part(symbol: char) -> bool {
    (symbol.is_ascii_alphanumeric() || symbol.is_ascii_punctuation()) && !is_reserved(symbol)
}

fn is_bracket_part(symbol: char) -> bool {
    (symbol.is_ascii_alphanumeric() || symbol.is_ascii_punctuation()) && symbol != ARG_SEPARATOR
}

fn matches_name(name: &str, start: fn(char) -> bool, part: fn(char) -> bool) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if start(first) => chars.all(part),
        _ => false,
    }
}

pub fn is_valid_function_name(name: &str) -> bool {
    matches_name(name, is_word_start, is_word_part)
}

pub fn is_valid_variable_name(name: &str) -> bool {
    matches_name(name, is_word_start, is_word_part)
}

pub fn is_valid_operator_name(name: &str) -> bool {
    matches_name(name, is_symbol_start, is_symbol_part)
}

/// Brackets may use the call parentheses themselves, so only the argument
/// separator is excluded.
pub fn is_valid_bracket_name(name: &str) -> bool {
    let first_ok = |symbol: char| {
        (symbol.is_ascii_alphabetic() || symbol.is_ascii_punctuation()) && symbol != ARG_SEPARATOR
    };
    matches_name(name, first_ok, is_bracket_part)
}

/// A source of operations, e.g. a bundled math library or a host plugin.
pub trait Extension {
    fn load(&self, registry: &mut Registry) -> Result<(), RegistryError>;
}

impl<F> Extension for F
where
    F: Fn(&mut Registry) -> Result<(), RegistryError>,
{
    fn load(&self, registry: &mut Registry) -> Result<(), RegistryError> {
        self(registry)
    }
}

/// Catalogue of every function, operator and bracket the tokenizer and
/// evaluator recognise.
///
/// A name lives in exactly one namespace. Within the operator namespace a
/// name may be registered once per kind (prefix, binary, postfix).
#[derive(Debug, Default, Clone)]
pub struct Registry {
    functions: HashMap<String, Operation>,
    operators: HashMap<String, Vec<Operation>>,
    brackets: HashMap<String, Operation>,
    longest_name: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation to the namespace matching its kind.
    pub fn register(&mut self, operation: Operation) -> Result<(), RegistryError> {
        let name = operation.name().to_string();
        let kind = operation.kind();

        let (valid, name_kind) = match kind {
            OperationKind::Function => (is_valid_function_name(&name), NameKind::Function),
            OperationKind::Binary | OperationKind::Prefix | OperationKind::Postfix => {
                (is_valid_operator_name(&name), NameKind::Operator)
            }
            OperationKind::OpenBracket | OperationKind::CloseBracket => {
                (is_valid_bracket_name(&name), NameKind::Bracket)
            }
        };
        if !valid {
            return Err(RegistryError::InvalidName {
                kind: name_kind,
                name,
            });
        }

        let collides = if kind.is_operator() {
            self.functions.contains_key(&name)
                || self.brackets.contains_key(&name)
                || self.lookup_operator(&name, kind).is_some()
        } else {
            self.contains(&name)
        };
        if collides {
            warn!("Rejected {kind:?} {name}: name already registered");
            return Err(RegistryError::NameCollision { name });
        }

        debug!("Registering {kind:?} {name}");
        self.longest_name = self.longest_name.max(name.len());
        match kind {
            OperationKind::Function => {
                self.functions.insert(name, operation);
            }
            OperationKind::Binary | OperationKind::Prefix | OperationKind::Postfix => {
                self.operators.entry(name).or_default().push(operation);
            }
            OperationKind::OpenBracket | OperationKind::CloseBracket => {
                self.brackets.insert(name, operation);
            }
        }
        Ok(())
    }

    /// Runs an extension against this registry.
    pub fn load<E: Extension + ?Sized>(&mut self, extension: &E) -> Result<(), RegistryError> {
        let before = self.len();
        extension.load(self)?;
        debug!("Extension loaded {} operations", self.len().saturating_sub(before));
        Ok(())
    }

    pub fn lookup_function(&self, name: &str) -> Option<&Operation> {
        self.functions.get(name)
    }

    pub fn lookup_bracket(&self, name: &str) -> Option<&Operation> {
        self.brackets.get(name)
    }

    pub fn lookup_operator(&self, name: &str, kind: OperationKind) -> Option<&Operation> {
        self.operators
            .get(name)?
            .iter()
            .find(|operation| operation.kind() == kind)
    }

    /// Byte length of the longest registered name.
    pub fn longest_name(&self) -> usize {
        self.longest_name
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn is_operator(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    pub fn is_bracket(&self, name: &str) -> bool {
        self.brackets.contains_key(name)
    }

    /// True if `name` is known in any namespace.
    pub fn contains(&self, name: &str) -> bool {
        self.is_function(name) || self.is_operator(name) || self.is_bracket(name)
    }

    /// Number of registered operations, counting each operator kind separately.
    pub fn len(&self) -> usize {
        self.functions.len()
            + self.brackets.len()
            + self.operators.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered operations, in no particular order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.functions
            .values()
            .chain(self.operators.values().flatten())
            .chain(self.brackets.values())
    }

    pub fn clear(&mut self) {
        debug!("Clearing registry of {} operations", self.len());
        self.functions.clear();
        self.operators.clear();
        self.brackets.clear();
        self.longest_name = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max() -> Operation {
        Operation::function("max", 2, |args| Ok(args[0].max(args[1])))
    }

    #[test]
    fn test_function_and_variable_names() {
        for name in ["x", "max", "getPi", "a1b2"] {
            assert!(is_valid_function_name(name), "{name}");
            assert!(is_valid_variable_name(name), "{name}");
        }
        for name in ["", "1x", "x_y", "x+", "a,b", "f(", "f)", "-x"] {
            assert!(!is_valid_function_name(name), "{name}");
            assert!(!is_valid_variable_name(name), "{name}");
        }
    }

    #[test]
    fn test_operator_names() {
        for name in ["+", "++", "^", "<=", "and", "-x", "!1"] {
            assert!(is_valid_operator_name(name), "{name}");
        }
        for name in ["", "(", ")", ",", "1+", "+,", "+(", "a b"] {
            assert!(!is_valid_operator_name(name), "{name}");
        }
    }

    #[test]
    fn test_bracket_names() {
        for name in ["(", ")", "[", "]", "|", "begin", "(("] {
            assert!(is_valid_bracket_name(name), "{name}");
        }
        for name in ["", ",", "(,", "1", " "] {
            assert!(!is_valid_bracket_name(name), "{name}");
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        registry.register(max()).unwrap();
        registry
            .register(Operation::binary("+", 1, |a, b| a + b))
            .unwrap();
        registry.register(Operation::open_bracket("(")).unwrap();
        registry
            .register(Operation::close_bracket(")", "("))
            .unwrap();

        assert_eq!(registry.lookup_function("max").map(|op| op.arity()), Some(Some(2)));
        assert!(registry.lookup_function("min").is_none());
        assert_eq!(
            registry
                .lookup_operator("+", OperationKind::Binary)
                .map(Operation::name),
            Some("+")
        );
        assert!(registry.lookup_operator("+", OperationKind::Prefix).is_none());
        assert_eq!(
            registry.lookup_bracket(")").and_then(Operation::pare),
            Some("(")
        );
        assert!(registry.contains("max"));
        assert!(registry.contains("("));
        assert!(!registry.contains("x"));
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.longest_name(), 3);
    }

    #[test]
    fn test_operator_kinds_share_a_name() {
        let mut registry = Registry::new();
        registry.register(Operation::prefix("-", 3, |a| -a)).unwrap();
        registry
            .register(Operation::binary("-", 1, |a, b| a - b))
            .unwrap();
        registry.register(Operation::postfix("-", |a| a - 1.0)).unwrap();

        assert_eq!(registry.len(), 3);
        for kind in [
            OperationKind::Prefix,
            OperationKind::Binary,
            OperationKind::Postfix,
        ] {
            assert_eq!(
                registry.lookup_operator("-", kind).map(Operation::kind),
                Some(kind)
            );
        }

        assert_eq!(
            registry.register(Operation::binary("-", 2, |a, b| b - a)),
            Err(RegistryError::NameCollision {
                name: "-".to_string()
            })
        );
    }

    #[test]
    fn test_collisions_across_namespaces() {
        let mut registry = Registry::new();
        registry.register(max()).unwrap();
        registry.register(Operation::open_bracket("[")).unwrap();
        registry.register(Operation::prefix("neg", 3, |a| -a)).unwrap();

        let attempts = [
            max(),
            Operation::binary("max", 1, |a, b| a.max(b)),
            Operation::open_bracket("max"),
            Operation::function("neg", 1, |args| Ok(-args[0])),
            Operation::open_bracket("neg"),
            Operation::postfix("[", |a| a),
            Operation::close_bracket("[", "["),
        ];
        for operation in attempts {
            let name = operation.name().to_string();
            assert_eq!(
                registry.register(operation),
                Err(RegistryError::NameCollision { name })
            );
        }
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut registry = Registry::new();

        assert_eq!(
            registry.register(Operation::function("2x", 1, |args| Ok(args[0]))),
            Err(RegistryError::InvalidName {
                kind: NameKind::Function,
                name: "2x".to_string()
            })
        );
        assert_eq!(
            registry.register(Operation::binary("(", 1, |a, _| a)),
            Err(RegistryError::InvalidName {
                kind: NameKind::Operator,
                name: "(".to_string()
            })
        );
        assert_eq!(
            registry.register(Operation::open_bracket(",")),
            Err(RegistryError::InvalidName {
                kind: NameKind::Bracket,
                name: ",".to_string()
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_extension_and_clear() {
        fn constants(registry: &mut Registry) -> Result<(), RegistryError> {
            registry.register(Operation::function("one", 0, |_| Ok(1.0)))?;
            registry.register(Operation::function("two", 0, |_| Ok(2.0)))
        }

        let mut registry = Registry::new();
        registry.load(&constants).unwrap();
        assert_eq!(registry.operations().count(), 2);

        assert!(registry.load(&constants).is_err());

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.longest_name(), 0);
        assert!(!registry.contains("one"));
    }
}
