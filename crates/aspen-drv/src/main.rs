//! The `aspen` command line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use aspen_drv::{run, Config, Mode};

/// The Aspen language interpreter.
#[derive(Parser, Debug)]
#[command(name = "aspen", version, about = "The Aspen language interpreter")]
#[command(group(ArgGroup::new("mode").args(["interpret", "lex", "parse", "type_check"])))]
struct Cli {
    /// Execute the program (default)
    #[arg(short = 'i', long)]
    interpret: bool,

    /// Print the token stream and exit
    #[arg(short = 'l', long)]
    lex: bool,

    /// Print the syntax tree and exit
    #[arg(short = 'p', long)]
    parse: bool,

    /// Run semantic analysis only
    #[arg(short = 't', long = "type-check")]
    type_check: bool,

    /// Read the program from standard input
    #[arg(long)]
    stdin: bool,

    /// Source file to run
    #[arg(required_unless_present = "stdin")]
    path: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mode = if cli.lex {
        Mode::Lex
    } else if cli.parse {
        Mode::Parse
    } else if cli.type_check {
        Mode::TypeCheck
    } else {
        Mode::Interpret
    };

    let config = Config {
        mode,
        path: cli.path,
        stdin: cli.stdin,
    };

    match run(&config) {
        Ok(code) => ExitCode::from(code as u8),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
