//! Command-line entry point for the interpreter.
//!
//! ```text
//! monkey-lang run <file.mky>
//! monkey-lang repl
//! monkey-lang version
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use monkey_lang::prelude::*;
use std::io::Write;

#[derive(Parser)]
#[command(name = "monkey-lang")]
#[command(about = "A tree-walking interpreter for a small scripting language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a source file.
    Run {
        /// Path to the script to execute.
        file: String,
    },
    /// Start an interactive read-eval-print loop.
    Repl,
    /// Print version information.
    Version,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file } => run_file(&file),
        Commands::Repl => run_repl(),
        Commands::Version => {
            println!("monkey-lang {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Reads and runs a whole file once. Per `spec.md` §6.1, a missing path or
/// unreadable file is the only case that exits non-zero here — a program
/// that parses and evaluates, even to a runtime error, prints that error's
/// Inspect form and exits 0, matching `cmd/run.go`'s unconditional
/// `fmt.Println(output.Inspect())`.
fn run_file(path: &str) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {path}"))?;
    info!("running {path} ({} bytes)", source.len());
    match monkey_lang::run(&source) {
        Ok(value) => println!("{value}"),
        Err(InterpretationError::Parse(errors)) => {
            for err in &errors {
                eprintln!("{err}");
            }
        }
        Err(InterpretationError::Runtime(message)) => println!("{message}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn run_repl() -> Result<()> {
    println!("Hello! This is the monkey-lang programming language!");
    println!("Feel free to type in commands:");
    let scope = Scope::new();
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!(">> ");
        std::io::stdout().flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let trimmed = line.trim();
        if trimmed == "quit" || trimmed == "q" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        match monkey_lang::run_in(trimmed, &scope) {
            Ok(value) => println!("{value}"),
            Err(InterpretationError::Parse(errors)) => {
                for err in &errors {
                    eprintln!("{err}");
                }
            }
            Err(InterpretationError::Runtime(message)) => println!("{message}"),
            Err(err) => eprintln!("{err}"),
        }
    }
    Ok(())
}
