use std::path::PathBuf;

use weft_core::GrammarDefError;
use weft_grammar::GrammarError;

pub mod check;
pub mod compile;
pub mod dump;
pub mod grammar_loader;
pub mod reparse;
pub mod tokens;
pub mod tree;


/// Failures surfaced to the user as `error: ...`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{}' is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },

    #[error(transparent)]
    Definition(#[from] GrammarDefError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("source required (positional or --source)")]
    MissingSource,

    #[error("invalid edit: {0}")]
    Edit(String),
}

/// Prints the error and exits with status 1.
pub fn fail(err: CliError) -> ! {
    eprintln!("error: {}", err);
    std::process::exit(1);
}
