//! Test fixtures and helpers.

use std::sync::Arc;

use indoc::indoc;
use weft_grammar::Grammar;

use crate::parser::{Edit, Parsed, Parser, TreeFragment};
use crate::tree::{SyntaxTree, TreeBuilder};

/// Parenthesized regions with plain bodies, words and whitespace.
pub const PARENS: &str = indoc! {r##"
    {
        "name": "parens",
        "root": ["#paren", "#word", "#space"],
        "repository": {
            "paren": {
                "node": "Paren",
                "begin": { "literal": "(", "node": "Open" },
                "end": { "literal": ")", "node": "Close" },
                "patterns": ["#paren", "#body"]
            },
            "body": { "match": "[^()]+", "node": "Body" },
            "word": { "match": "[a-z]+", "node": "Word" },
            "space": { "match": "\\s+" }
        }
    }
"##};

/// Heredoc region closed by the delimiter its opening line declared.
pub const HEREDOC: &str = indoc! {r##"
    {
        "name": "heredoc",
        "context": { "delim": "" },
        "root": ["#heredoc", "#word", "#space"],
        "repository": {
            "heredoc": {
                "node": "Heredoc",
                "begin": {
                    "match": "<<([A-Z]+)",
                    "node": "Start",
                    "context": [{ "set": "delim", "to": "$1" }]
                },
                "end": { "match": "$var:delim", "node": "End" },
                "patterns": [{ "match": "[a-z]+", "node": "Line" }, "#space"]
            },
            "word": { "match": "[a-z]+", "node": "Word" },
            "space": { "match": "\\s+" }
        }
    }
"##};

pub fn grammar(json: &str) -> Grammar {
    Grammar::from_json(json).unwrap()
}

pub fn parse(grammar: &Grammar, text: &str) -> Parsed<SyntaxTree> {
    Parser::new(grammar, text, TreeBuilder).parse()
}

/// Parses `text` reusing `old`, which covered the document before `edit`.
pub fn reparse(grammar: &Grammar, old: SyntaxTree, text: &str, edit: Option<Edit>) -> Parsed<SyntaxTree> {
    let to = old.root().to;
    let fragment = TreeFragment::new(Arc::new(old), 0, to);
    Parser::new(grammar, text, TreeBuilder)
        .reuse(vec![fragment], edit)
        .parse()
}

/// `(from, length)` of every chunk.
pub fn chunk_spans(tree: &SyntaxTree) -> Vec<(usize, usize)> {
    use crate::tree::ChunkSource;

    tree.chunks()
        .unwrap()
        .chunks()
        .iter()
        .map(|chunk| (chunk.from, chunk.length))
        .collect()
}
