//! Argument builders reused across subcommands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Grammar file (positional). `.bin` files load as compiled grammars.
pub fn grammar_arg() -> Arg {
    Arg::new("grammar")
        .value_name("GRAMMAR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Grammar file (JSON, or compiled `.bin`)")
}

/// Source file to tokenize (positional).
pub fn source_path_arg() -> Arg {
    Arg::new("source_path")
        .value_name("SOURCE")
        .value_parser(value_parser!(PathBuf))
        .help("Source file to tokenize, `-` for stdin")
}

/// Inline source text (-s/--source).
pub fn source_text_arg() -> Arg {
    Arg::new("source_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .conflicts_with("source_path")
        .help("Inline source text")
}

/// Output file (-o/--output).
pub fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Where to write the compiled grammar")
}

/// Tokens per chunk (--chunk-capacity).
pub fn chunk_capacity_arg() -> Arg {
    Arg::new("chunk_capacity")
        .long("chunk-capacity")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Tokens per chunk before a new one starts [default: 64]")
}

/// Drop unterminated regions instead of marking them (--no-close-incomplete).
pub fn no_close_incomplete_arg() -> Arg {
    Arg::new("no_close_incomplete")
        .long("no-close-incomplete")
        .action(ArgAction::SetTrue)
        .help("Leave unterminated regions open instead of closing them with a marker")
}

/// JSON output (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of text")
}

/// Edit start (--from).
pub fn edit_from_arg() -> Arg {
    Arg::new("from")
        .long("from")
        .value_name("N")
        .required(true)
        .value_parser(value_parser!(usize))
        .help("Start of the replaced range, in bytes")
}

/// Edit end (--to).
pub fn edit_to_arg() -> Arg {
    Arg::new("to")
        .long("to")
        .value_name("M")
        .value_parser(value_parser!(usize))
        .help("End of the replaced range, in bytes [default: --from]")
}

/// Inserted text (--insert).
pub fn insert_arg() -> Arg {
    Arg::new("insert")
        .long("insert")
        .value_name("TEXT")
        .help("Text inserted in place of the range")
}

/// Verbosity (-v, repeatable).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .global(true)
        .help("Log more (-v debug, -vv trace); WEFT_LOG overrides")
}
