use crate::error::{EvalError, RegistryError};
use crate::expression::{Associativity, Bindings, Operand, Operation, Registry};
use opcalc_macros::opcalc_fn;

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(Operation::binary("+", 1, |a, b| a + b))?;
    registry.register(Operation::binary("-", 1, |a, b| a - b))?;
    registry.register(Operation::binary("*", 2, |a, b| a * b))?;
    registry.register(Operation::binary("/", 2, |a, b| a / b))?;
    registry.register(Operation::binary("%", 2, |a, b| a % b))?;
    registry.register(Operation::binary_with("=", 0, Associativity::Right, assign))?;

    registry.register(Operation::prefix("-", 3, |a| -a))?;
    registry.register(Operation::prefix("+", 3, |a| a))?;
    registry.register(Operation::prefix_with("++", 5, |bindings, operand| {
        step(bindings, operand, "++", 1.0).map(|(_, new)| new)
    }))?;
    registry.register(Operation::prefix_with("--", 5, |bindings, operand| {
        step(bindings, operand, "--", -1.0).map(|(_, new)| new)
    }))?;
    registry.register(Operation::postfix_with("++", |bindings, operand| {
        step(bindings, operand, "++", 1.0).map(|(old, _)| old)
    }))?;
    registry.register(Operation::postfix_with("--", |bindings, operand| {
        step(bindings, operand, "--", -1.0).map(|(old, _)| old)
    }))?;

    registry.register(Operation::open_bracket("("))?;
    registry.register(Operation::close_bracket(")", "("))?;

    registry.register(max())?;
    registry.register(min())?;
    registry.register(abs())?;
    registry.register(sqrt())?;
    Ok(())
}

fn assign(bindings: &mut Bindings, target: Operand, value: Operand) -> Result<f64, EvalError> {
    let id = target
        .as_variable()
        .ok_or_else(|| EvalError::NotAssignable("=".to_string()))?;
    let value = bindings.value(value)?;
    bindings.set(id, value);
    Ok(value)
}

/// Adds `delta` to a variable in place, returning its old and new value.
fn step(
    bindings: &mut Bindings,
    operand: Operand,
    name: &str,
    delta: f64,
) -> Result<(f64, f64), EvalError> {
    let id = operand
        .as_variable()
        .ok_or_else(|| EvalError::NotAVariable(name.to_string()))?;
    let old = bindings.value(operand)?;
    bindings.set(id, old + delta);
    Ok((old, old + delta))
}

#[opcalc_fn]
fn max(a: f64, b: f64) -> f64 {
    if a > b {
        a
    } else {
        b
    }
}

#[opcalc_fn]
fn min(a: f64, b: f64) -> f64 {
    if a < b {
        a
    } else {
        b
    }
}

#[opcalc_fn]
fn abs(x: f64) -> f64 {
    x.abs()
}

#[opcalc_fn]
fn sqrt(x: f64) -> Result<f64, EvalError> {
    if x < 0.0 {
        return Err(EvalError::Domain {
            operation: "sqrt".to_string(),
            message: format!("negative argument {}", x),
        });
    }
    Ok(x.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Evaluator, OperationKind, VariableStore};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        registry
    }

    #[test]
    fn test_registered_operations() {
        let registry = registry();

        assert_eq!(
            registry
                .lookup_operator("=", OperationKind::Binary)
                .and_then(Operation::associativity),
            Some(Associativity::Right)
        );
        for name in ["-", "++", "--"] {
            assert!(registry.lookup_operator(name, OperationKind::Prefix).is_some());
        }
        for name in ["++", "--"] {
            assert!(registry.lookup_operator(name, OperationKind::Postfix).is_some());
        }
        assert_eq!(registry.lookup_bracket(")").and_then(Operation::pare), Some("("));
        assert_eq!(registry.lookup_function("max").and_then(Operation::arity), Some(2));
        assert_eq!(registry.lookup_function("sqrt").and_then(Operation::arity), Some(1));
    }

    #[test]
    fn test_registering_twice_collides() {
        let mut registry = registry();
        assert!(matches!(
            register(&mut registry),
            Err(RegistryError::NameCollision { .. })
        ));
    }

    #[test]
    fn test_assignment_and_steps() {
        let registry = registry();
        let store = VariableStore::new();
        let evaluator = Evaluator::new(&registry, &store);

        assert_eq!(evaluator.evaluate("n = 2 * 3"), Ok(6.0));
        assert_eq!(evaluator.evaluate("n-- * 2"), Ok(12.0));
        assert_eq!(evaluator.evaluate("-n"), Ok(-5.0));
        assert_eq!(store.get("n"), Some(5.0));
        assert_eq!(
            evaluator.evaluate("max(1, 2) = 3"),
            Err(EvalError::NotAssignable("=".to_string()))
        );
    }

    #[test]
    fn test_functions() {
        let registry = registry();
        let store = VariableStore::new();
        let evaluator = Evaluator::new(&registry, &store);

        assert_eq!(evaluator.evaluate("min(4, -2)"), Ok(-2.0));
        assert_eq!(evaluator.evaluate("abs(-2.5)"), Ok(2.5));
        assert_eq!(evaluator.evaluate("sqrt(16)"), Ok(4.0));
        assert_eq!(evaluator.evaluate("max(1, 2) - 1"), Ok(1.0));
        assert!(matches!(
            evaluator.evaluate("sqrt(-1)"),
            Err(EvalError::Domain { .. })
        ));
    }
}
