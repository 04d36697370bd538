use std::path::PathBuf;

use super::fail;
use super::grammar_loader::load_grammar;

pub struct DumpArgs {
    pub grammar_path: PathBuf,
}

pub fn run(args: DumpArgs) {
    let grammar = load_grammar(&args.grammar_path).unwrap_or_else(|err| fail(err));
    print!("{}", grammar.dump());
}
