use std::{env, process};

fn main() {
    let config = liker::Config::build(env::args()).unwrap_or_else(|e| {
        eprintln!("Problem parsing arguments: {}", e);
        process::exit(1);
    });

    if let Err(e) = liker::run(config) {
        eprintln!("Application error: {}", e);
        process::exit(1);
    }
}
