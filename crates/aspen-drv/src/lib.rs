//! aspen-drv - Pipeline orchestration for the `aspen` binary.
//!
//! Source -> lexer -> parser -> type checker -> evaluator, halting at the
//! first stage that reports a diagnostic. Diagnostics render to stderr;
//! program output goes to stdout. Exit code 0 on success, 1 on any
//! reported error.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use aspen_eval::{interpret, NativeRegistry};
use aspen_lex::scan_tokens;
use aspen_par::parse;
use aspen_sem::type_check;
use aspen_util::Reporter;

/// What to do with the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Execute the program (the default).
    #[default]
    Interpret,
    /// Print the token stream and exit.
    Lex,
    /// Print the syntax tree as an S-expression and exit.
    Parse,
    /// Run semantic analysis only.
    TypeCheck,
}

/// One driver invocation.
#[derive(Debug)]
pub struct Config {
    pub mode: Mode,
    /// Source file; ignored when `stdin` is set.
    pub path: Option<PathBuf>,
    /// Read the program from standard input instead of a file.
    pub stdin: bool,
}

/// Runs the pipeline and returns the process exit code.
pub fn run(config: &Config) -> Result<i32> {
    let text = read_source(config)?;
    let source: Vec<char> = text.chars().collect();
    let mut reporter = Reporter::new(&source);

    debug!("lexing");
    let tokens = scan_tokens(&source, &mut reporter);
    if config.mode == Mode::Lex {
        println!("{tokens}");
        return Ok(finish(&reporter));
    }
    if reporter.had_error() {
        return Ok(finish(&reporter));
    }

    debug!("parsing");
    let mut program = parse(tokens, &mut reporter);
    if config.mode == Mode::Parse {
        println!("{program}");
        return Ok(finish(&reporter));
    }
    if reporter.had_error() {
        return Ok(finish(&reporter));
    }

    debug!("type checking");
    let natives = NativeRegistry::standard();
    type_check(&mut program, &natives.signatures(), &mut reporter);
    if reporter.had_error() || config.mode == Mode::TypeCheck {
        return Ok(finish(&reporter));
    }

    debug!("interpreting");
    let stdout = std::io::stdout();
    interpret(&program, &natives, stdout.lock());
    Ok(0)
}

fn finish(reporter: &Reporter<'_>) -> i32 {
    if reporter.had_error() {
        eprint!("{}", reporter.render());
        1
    } else {
        0
    }
}

fn read_source(config: &Config) -> Result<String> {
    if config.stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("cannot read from standard input")?;
        return Ok(text);
    }

    let path = config.path.as_ref().context("no input file")?;
    std::fs::read_to_string(path).with_context(|| format!("cannot open file {}", path.display()))
}
