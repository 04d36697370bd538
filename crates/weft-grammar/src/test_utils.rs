//! Test fixtures and helpers.

use indoc::indoc;

use crate::{Grammar, GrammarToken};

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

pub fn grammar(json: &str) -> Grammar {
    Grammar::from_json(json).unwrap()
}

/// Renders a token as `+Open Name@from..to -Close`, `_` for silent tokens.
pub fn render(grammar: &Grammar, token: &GrammarToken) -> String {
    let mut out = String::new();
    for id in &token.open {
        out.push('+');
        out.push_str(grammar.node_name(*id));
        out.push(' ');
    }
    let name = token.id.map_or("_", |id| grammar.node_name(id));
    out.push_str(&format!("{name}@{}..{}", token.from, token.to));
    for id in &token.close {
        out.push_str(" -");
        out.push_str(grammar.node_name(*id));
    }
    out
}

/// Matches `text` step by step from the initial state.
pub fn lex(grammar: &Grammar, text: &str) -> Vec<String> {
    let mut state = grammar.initial_state();
    let mut pos = 0;
    let mut out = Vec::new();
    while let Some(result) = grammar.match_at(&state, text, pos) {
        assert!(result.length > 0, "no progress at {pos}");
        out.extend(result.tokens.iter().map(|t| render(grammar, t)));
        pos += result.length;
        state = result.state;
    }
    assert_eq!(pos, text.len());
    out
}
