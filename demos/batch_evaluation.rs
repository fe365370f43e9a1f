use opcalc_rs::Calculator;

fn main() {
    pretty_env_logger::init();

    let calculator = Calculator::new(0).unwrap();
    let registry = calculator.registry();
    calculator.store().set("price", 120.0, registry).unwrap();
    calculator.store().set("volume", 3000.0, registry).unwrap();

    let expressions = [
        "price * volume",
        "max(price, 100) / 4",
        "spread = price % 7",
        "volume / (price - 120)",
        "price +",
    ];

    let results = calculator.evaluate_batch(&expressions);
    for (i, (expression, result)) in expressions.iter().zip(results).enumerate() {
        match result {
            Ok(value) => println!("Result {}: {} = {:.6}", i, expression, value),
            Err(err) => println!("Result {}: {} failed: {}", i, expression, err),
        }
    }

    println!("variables: {:?}", calculator.store().snapshot());
}
