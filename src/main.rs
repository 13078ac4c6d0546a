use std::process;

use clap::Parser;

use cp437::args::Args;
use cp437::{logging, session};

fn main() {
    logging::init();
    let args = Args::parse();

    match session::run(&args.command) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("cp437: {err}");
            process::exit(1);
        }
    }
}
