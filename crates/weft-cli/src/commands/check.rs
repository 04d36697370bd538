use std::path::PathBuf;

use super::fail;
use super::grammar_loader::load_grammar;

pub struct CheckArgs {
    pub grammar_path: PathBuf,
}

/// Silent on success, like a compiler with nothing to report.
pub fn run(args: CheckArgs) {
    if let Err(err) = load_grammar(&args.grammar_path) {
        fail(err);
    }
}
