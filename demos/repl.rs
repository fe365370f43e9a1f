use opcalc_rs::Calculator;
use std::io::{self, BufRead, Write};

fn main() -> io::Result<()> {
    pretty_env_logger::init();

    let mut calculator = match Calculator::new(100) {
        Ok(calculator) => calculator,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            "exit" => break,
            ":vars" => {
                for (name, value) in calculator.store().snapshot() {
                    println!("{name} = {value:.6}");
                }
            }
            expression => match calculator.evaluate(expression) {
                Ok(value) => println!("{value:.6}"),
                Err(err) => println!("{err}"),
            },
        }
    }
    Ok(())
}
