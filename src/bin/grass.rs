//! Command-line front end (spec §6 "CLI surface"): one positional source
//! filename, or a `compile` subcommand reading SCSS from standard input.
//! `--precision` is accepted for compatibility with other Sass compilers
//! but has no effect on the fixed-precision printer.

use std::io::{self, Read, Write};
use std::process;

use clap::{App, Arg, SubCommand};
use grasscss::StyleSheet;

fn main() {
    env_logger::init();

    let matches = App::new("grass")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A SCSS to CSS compiler")
        .arg(
            Arg::with_name("precision")
                .long("precision")
                .takes_value(true)
                .help("Number precision to output (accepted, currently ignored)"),
        )
        .arg(Arg::with_name("INPUT").help("The SCSS file to compile").index(1))
        .subcommand(
            SubCommand::with_name("compile")
                .about("Compiles SCSS read from standard input")
                .arg(
                    Arg::with_name("precision")
                        .long("precision")
                        .takes_value(true)
                        .help("Number precision to output (accepted, currently ignored)"),
                ),
        )
        .get_matches();

    let result = if matches.subcommand_matches("compile").is_some() {
        compile_stdin()
    } else if let Some(input) = matches.value_of("INPUT") {
        compile_path(input)
    } else {
        eprintln!("Error: no input file given. Pass a filename or use the `compile` subcommand.");
        process::exit(1);
    };

    if let Err(message) = result {
        eprintln!("{}", message);
        process::exit(1);
    }
}

fn compile_path(input: &str) -> Result<(), String> {
    let sheet = StyleSheet::from_path(input).map_err(|e| e.to_string())?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    sheet.print_as_css(&mut handle).map_err(|e| e.to_string())
}

fn compile_stdin() -> Result<(), String> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| e.to_string())?;
    let sheet = StyleSheet::new(&source).map_err(|e| e.to_string())?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    sheet.print_as_css(&mut handle).map_err(|e| e.to_string())?;
    handle.flush().map_err(|e| e.to_string())
}
