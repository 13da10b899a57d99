//! glud - check words against a right-linear grammar
//!
//! Reads a grammar declaration and a comma separated word list, converts the
//! grammar into a deterministic automaton and prints the verdict per word.

use anyhow::Context;
use clap::{ArgAction, Parser};
use glud::{Automaton, Declaration, parse_word_list};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glud")]
#[command(about = "Convert a right-linear grammar into a DFA and test words against it")]
#[command(version)]
struct Cli {
    /// Grammar declaration file
    grammar: PathBuf,

    /// File with the comma separated words to test
    words: PathBuf,

    /// Log conversion steps (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let source = fs::read_to_string(&cli.grammar)
        .with_context(|| format!("cannot read grammar file '{}'", cli.grammar.display()))?;
    let words = fs::read_to_string(&cli.words)
        .with_context(|| format!("cannot read word file '{}'", cli.words.display()))?;

    let declaration = Declaration::parse(&source)
        .with_context(|| format!("cannot parse '{}'", cli.grammar.display()))?;
    let mut automaton = Automaton::new(&declaration)
        .with_context(|| format!("cannot build automaton '{}'", declaration.name))?;
    automaton.convert();

    println!("{}", summary(&automaton));
    println!("{automaton}");
    println!("Word tests:\n");
    for word in parse_word_list(&words) {
        println!("{word}: {}", automaton.accepts(&word));
    }

    Ok(())
}

fn summary(automaton: &Automaton) -> &'static str {
    if automaton.determinized() {
        "The generated automaton had to be determinized. The resulting automaton:"
    } else if automaton.removed_epsilon() {
        "Epsilon moves were removed from the automaton. The resulting automaton:"
    } else {
        "The automaton built from the grammar was already a DFA. The generated automaton:"
    }
}
