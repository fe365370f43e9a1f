use crate::error::RegistryError;
use crate::expression::{Operation, Registry};
use opcalc_macros::opcalc_fn;
use std::f64::consts::{FRAC_PI_2, PI};

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(sin())?;
    registry.register(cos())?;
    registry.register(tan())?;
    registry.register(cot())?;
    registry.register(arcsin())?;
    registry.register(arccos())?;
    registry.register(arctan())?;
    registry.register(arccot())?;
    registry.register(get_pi())?;
    Ok(())
}

#[opcalc_fn]
fn sin(x: f64) -> f64 {
    x.sin()
}

#[opcalc_fn]
fn cos(x: f64) -> f64 {
    x.cos()
}

#[opcalc_fn]
fn tan(x: f64) -> f64 {
    x.tan()
}

#[opcalc_fn]
fn cot(x: f64) -> f64 {
    1.0 / x.tan()
}

#[opcalc_fn]
fn arcsin(x: f64) -> f64 {
    x.asin()
}

#[opcalc_fn]
fn arccos(x: f64) -> f64 {
    x.acos()
}

#[opcalc_fn]
fn arctan(x: f64) -> f64 {
    x.atan()
}

// Range (0, pi).
#[opcalc_fn]
fn arccot(x: f64) -> f64 {
    FRAC_PI_2 - x.atan()
}

#[opcalc_fn(name = "getPi")]
fn get_pi() -> f64 {
    PI
}
