use std::path::PathBuf;

use weft_engine::{ParseConfig, Parser, TreeBuilder};

use super::fail;
use super::grammar_loader::{load_grammar, load_source};

pub struct TreeArgs {
    pub grammar_path: PathBuf,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub config: ParseConfig,
}

pub fn run(args: TreeArgs) {
    let grammar = load_grammar(&args.grammar_path).unwrap_or_else(|err| fail(err));
    let source = load_source(args.source_path.as_ref(), args.source_text.as_deref())
        .unwrap_or_else(|err| fail(err));

    let parsed = Parser::new(&grammar, source.as_str(), TreeBuilder)
        .config(args.config)
        .parse();
    print!("{}", parsed.tree.dump(&grammar));
}
