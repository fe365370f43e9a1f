pub mod calculator;
pub mod error;
pub mod expression;
pub mod functions;

pub use calculator::Calculator;
pub use error::{CalcError, EvalError, LexError, NameKind, RegistryError, StoreError};
pub use expression::{Evaluator, Extension, Operation, Registry, Token, TokenKind, VariableStore};
pub use opcalc_macros::opcalc_fn;

use functions::register_functions;

/// Evaluates a single expression with the bundled libraries, reading and
/// updating variables in `store`.
pub fn evaluate_expression(expression: &str, store: &VariableStore) -> Result<f64, CalcError> {
    let mut registry = Registry::new();
    register_functions(&mut registry)?;

    let value = Evaluator::new(&registry, store).evaluate(expression)?;
    Ok(value)
}
