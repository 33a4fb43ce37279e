// Splits each argument with the argv tokenizer and prints the pieces.

use argstack::parse_argv_string;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        println!("usage: test-argv string ...");
        std::process::exit(1);
    }

    let mut failed = false;
    for s in &args {
        match parse_argv_string(s) {
            Ok(parsed) => {
                println!("size={}", parsed.len());
                for arg in &parsed {
                    println!("'{}'", arg);
                }
            }
            Err(e) => {
                eprintln!("cannot parse '{}': {}", s, e);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
