use crate::error::{EvalError, RegistryError};
use crate::expression::{Operation, Registry};
use opcalc_macros::opcalc_fn;
use std::f64::consts::E;

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(ln())?;
    registry.register(exp())?;
    registry.register(log())?;
    registry.register(get_exp())?;
    Ok(())
}

#[opcalc_fn]
fn ln(x: f64) -> f64 {
    x.ln()
}

#[opcalc_fn]
fn exp(x: f64) -> f64 {
    x.exp()
}

/// Logarithm of `x` to `base`.
#[opcalc_fn]
fn log(base: f64, x: f64) -> Result<f64, EvalError> {
    if base <= 0.0 || base == 1.0 {
        return Err(EvalError::Domain {
            operation: "log".to_string(),
            message: format!("invalid base {}", base),
        });
    }
    Ok(x.ln() / base.ln())
}

#[opcalc_fn(name = "getExp")]
fn get_exp() -> f64 {
    E
}
