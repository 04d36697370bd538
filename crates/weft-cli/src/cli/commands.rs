//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Add the parse tuning flags.
fn with_parse_args(cmd: Command) -> Command {
    cmd.arg(chunk_capacity_arg()).arg(no_close_incomplete_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("weft")
        .about("Incremental lexer grammars: check, inspect and run them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(check_command())
        .subcommand(dump_command())
        .subcommand(compile_command())
        .subcommand(tokens_command())
        .subcommand(tree_command())
        .subcommand(reparse_command())
}

/// Validate a grammar.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate a grammar")
        .after_help(
            r#"EXAMPLES:
  weft check grammar.json
  weft check grammar.bin"#,
        )
        .arg(grammar_arg())
}

/// List a grammar's nodes, states and rules.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("List the compiled nodes, states and rules of a grammar")
        .arg(grammar_arg())
}

/// Compile a JSON grammar to the binary format.
pub fn compile_command() -> Command {
    Command::new("compile")
        .about("Validate a grammar and write it in the compact binary format")
        .after_help(
            r#"EXAMPLES:
  weft compile grammar.json -o grammar.bin"#,
        )
        .arg(grammar_arg())
        .arg(output_arg())
}

/// Show the chunked token stream of a source.
pub fn tokens_command() -> Command {
    let cmd = Command::new("tokens")
        .about("Show the chunks and tokens of a source")
        .override_usage(
            "\
  weft tokens <GRAMMAR> <SOURCE>
  weft tokens <GRAMMAR> -s <TEXT>",
        )
        .arg(grammar_arg())
        .arg(source_path_arg())
        .arg(source_text_arg())
        .arg(json_arg());
    with_parse_args(cmd)
}

/// Show the syntax tree of a source.
pub fn tree_command() -> Command {
    let cmd = Command::new("tree")
        .about("Show the syntax tree of a source")
        .override_usage(
            "\
  weft tree <GRAMMAR> <SOURCE>
  weft tree <GRAMMAR> -s <TEXT>",
        )
        .arg(grammar_arg())
        .arg(source_path_arg())
        .arg(source_text_arg());
    with_parse_args(cmd)
}

/// Parse, apply one edit, and reparse incrementally.
pub fn reparse_command() -> Command {
    let cmd = Command::new("reparse")
        .about("Apply an edit to a source and reparse it incrementally")
        .after_help(
            r#"EXAMPLES:
  weft reparse grammar.json doc.txt --from 120 --insert x
  weft reparse grammar.json doc.txt --from 10 --to 20"#,
        )
        .arg(grammar_arg())
        .arg(source_path_arg().required(true))
        .arg(edit_from_arg())
        .arg(edit_to_arg())
        .arg(insert_arg());
    with_parse_args(cmd)
}
