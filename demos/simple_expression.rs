use log::debug;
use opcalc_rs::expression::tokenize;
use opcalc_rs::{opcalc_fn, Calculator, Operation, Registry, VariableStore};
use std::sync::Arc;

#[opcalc_fn]
fn hypot(a: f64, b: f64) -> f64 {
    a.hypot(b)
}

fn main() {
    pretty_env_logger::init();

    let mut registry = Registry::new();
    opcalc_rs::functions::register_functions(&mut registry).unwrap();
    registry.register(hypot()).unwrap();

    let expr = "side = hypot(3, 4) * 2";
    let tokens = tokenize(&registry, expr).unwrap();
    debug!("tokens: {tokens:?}");

    let store = Arc::new(VariableStore::new());
    let mut calculator = Calculator::with_parts(Arc::new(registry), store, 16);
    for expression in [expr, "side ^ 2", "side++ + side", "max(side, 100)"] {
        match calculator.evaluate(expression) {
            Ok(result) => println!("{expression} = {result}"),
            Err(err) => println!("{expression}: {err}"),
        }
    }

    println!("variables: {:?}", calculator.store().snapshot());
}
