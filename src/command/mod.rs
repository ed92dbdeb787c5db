mod align;

use colored::Colorize;
use crate::Error;

const PROGRAM: &str = env!("CARGO_PKG_NAME");

/// Print tool version and authors.
fn print_version() {
    println!("{} {}", PROGRAM.underline(), format!("v{}", env!("CARGO_PKG_VERSION")).green());
    let authors: Vec<_> = env!("CARGO_PKG_AUTHORS").split(':').filter(|s| !s.is_empty()).collect();
    let n = authors.len();
    if n == 0 {
        return;
    }
    print!("Created by ");
    for (i, author) in authors.iter().enumerate() {
        if i == 0 {
            print!("{}", author.bright_blue());
        } else if i < n - 1 {
            print!(", {}", author.bright_blue());
        } else {
            print!(" and {}", author.bright_blue());
        }
    }
    println!();
}

/// Log the program name and version before the start of the command.
fn greet() {
    log::info!("{} v{}", PROGRAM.underline(), env!("CARGO_PKG_VERSION"));
}

/// Formats default value for the help message.
fn fmt_def(val: impl std::fmt::Display) -> colored::ColoredString {
    val.to_string().cyan()
}

/// Empty value column for flags without arguments.
fn flag() -> colored::ColoredString {
    "".normal()
}

fn print_help() {
    print_version();
    println!("\n{} {} command [arguments]", "Usage:".bold(), PROGRAM);

    println!("\n{}", "[ Alignment stage ]".bold());
    println!("    {:<7}  Reconstruct multiple sequence alignment of homologous sequences.", "align".red());

    println!("\n{}", "[ General help ]".bold());
    println!("    {:<7}  Show this help message.", "help".red());
    println!("    {:<7}  Show version.", "version".red());
}

/// Returns true if trace messages were requested with `--debug`.
pub fn debug_requested(argv: &[String]) -> bool {
    argv.iter().skip(1).any(|arg| arg == "--debug")
}

pub fn run(argv: &[String]) -> Result<(), Error> {
    if argv.len() <= 1 {
        print_help();
        std::process::exit(1);
    }
    match &argv[1] as &str {
        "align" => align::run(&argv[2..])?,
        "help" | "h" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-V" => print_version(),
        cmd => {
            print_help();
            return Err(Error::InvalidInput(format!("Unknown command `{}`", cmd)));
        }
    }
    Ok(())
}
