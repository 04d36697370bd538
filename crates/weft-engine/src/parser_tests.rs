use std::sync::Arc;

use weft_core::NodeId;

use crate::config::ParseConfig;
use crate::parser::{Edit, Parser, TreeFragment};
use crate::test_utils::{HEREDOC, PARENS, chunk_spans, grammar, parse, reparse};
use crate::tree::{SyntaxTree, TreeBuilder};

fn names(g: &weft_grammar::Grammar, tree: &SyntaxTree) -> Vec<String> {
    tree.walk()
        .skip(1)
        .map(|(depth, node)| {
            format!(
                "{}{}@{}..{}",
                " ".repeat(depth - 1),
                g.node_name(node.kind),
                node.from,
                node.to
            )
        })
        .collect()
}

fn insert(text: &str, at: usize, inserted: &str) -> String {
    format!("{}{inserted}{}", &text[..at], &text[at..])
}

#[test]
fn paren_region_spans_its_delimiters() {
    let g = grammar(PARENS);
    let parsed = parse(&g, "(ab)");

    assert_eq!(
        names(&g, &parsed.tree),
        ["Paren@0..4", " Open@0..1", " Body@1..3", " Close@3..4"]
    );
    assert_eq!(parsed.stats.matches, 3);
}

#[test]
fn unterminated_region_gets_one_marker() {
    let g = grammar(PARENS);
    let tree = parse(&g, "(ab").tree;

    assert_eq!(
        names(&g, &tree),
        ["Paren@0..3", " Open@0..1", " Body@1..3", " Incomplete@3..3"]
    );
    let markers = tree
        .walk()
        .filter(|(_, node)| node.kind == NodeId::INCOMPLETE)
        .count();
    assert_eq!(markers, 1);
}

#[test]
fn unterminated_region_without_marker() {
    let g = grammar(PARENS);
    let tree = Parser::new(&g, "(ab", TreeBuilder)
        .config(ParseConfig::new().close_incomplete(false))
        .parse()
        .tree;

    assert_eq!(names(&g, &tree), ["Open@0..1", "Body@1..3"]);
}

#[test]
fn error_per_character() {
    let g = grammar(r#"{ "name": "t", "root": [{ "literal": "a", "node": "A" }] }"#);
    let parsed = parse(&g, "!?é");

    assert_eq!(names(&g, &parsed.tree), ["⚠@0..1", "⚠@1..2", "⚠@2..4"]);
    assert_eq!(parsed.stats.matches, 3);
}

#[test]
fn empty_document() {
    let g = grammar(PARENS);
    let parsed = parse(&g, "");

    assert_eq!(parsed.tree.root().kind, NodeId::DOCUMENT);
    assert!(parsed.tree.root().children.is_empty());
    assert_eq!(parsed.stats.matches, 0);
}

#[test]
fn single_character() {
    let g = grammar(PARENS);

    assert_eq!(names(&g, &parse(&g, "a").tree), ["Word@0..1"]);
    assert_eq!(names(&g, &parse(&g, ")").tree), ["⚠@0..1"]);
}

#[test]
fn forced_error_when_window_is_too_small() {
    let g = grammar(PARENS);
    let parsed = Parser::new(&g, "é", TreeBuilder)
        .config(ParseConfig::new().margin_after(1))
        .parse();

    assert_eq!(names(&g, &parsed.tree), ["⚠@0..2"]);
    assert_eq!(parsed.stats.forced_errors, 1);
}

#[test]
fn stop_at_finalizes_early() {
    let g = grammar(PARENS);
    let mut parser = Parser::new(&g, "(ab)(cd)", TreeBuilder);
    parser.stop_at(3);

    let tree = loop {
        if let Some(tree) = parser.advance() {
            break tree;
        }
    };
    assert!(parser.is_finished());
    assert!(parser.advance().is_none());
    assert_eq!(parser.parsed_pos(), 3);
    assert_eq!(
        names(&g, &tree),
        ["Paren@0..3", " Open@0..1", " Body@1..3", " Incomplete@3..3"]
    );
}

#[test]
fn disjoint_ranges() {
    let g = grammar(PARENS);
    let tree = Parser::new(&g, "(ab)XX(cd)", TreeBuilder)
        .ranges(vec![6..10, 0..4])
        .parse()
        .tree;

    assert_eq!(
        names(&g, &tree),
        [
            "Paren@0..4",
            " Open@0..1",
            " Body@1..3",
            " Close@3..4",
            "Paren@6..10",
            " Open@6..7",
            " Body@7..9",
            " Close@9..10",
        ]
    );
}

#[test]
fn context_variables_survive_chunking() {
    let g = grammar(HEREDOC);
    let text = "<<EOF\nabc\nEOF\nxyz";
    let tree = Parser::new(&g, text, TreeBuilder)
        .config(ParseConfig::new().chunk_capacity(1))
        .parse()
        .tree;

    assert_eq!(
        names(&g, &tree),
        [
            "Heredoc@0..13",
            " Start@0..5",
            " Line@6..9",
            " End@10..13",
            "Word@14..17",
        ]
    );
}

#[test]
fn noop_reparse_is_identical() {
    let g = grammar(PARENS);
    let text = "(ab) x (c(d)) ".repeat(200);
    let fresh = parse(&g, &text);

    let again = reparse(&g, fresh.tree.clone(), &text, None);
    assert_eq!(again.tree, fresh.tree);
    assert_eq!(chunk_spans(&again.tree), chunk_spans(&fresh.tree));
    assert!(again.stats.reused_left > 0);
    assert!(again.stats.matches * 10 < fresh.stats.matches);
}

#[test]
fn insertion_reuses_both_sides() {
    let g = grammar(PARENS);
    let old = "(ab) ".repeat(20_000);
    let new = insert(&old, 50_002, "x");
    let fresh = parse(&g, &new);

    let old_tree = parse(&g, &old).tree;
    let reparsed = reparse(&g, old_tree, &new, Some(Edit::insert(50_002, 1)));

    assert_eq!(reparsed.tree, fresh.tree);
    assert_eq!(chunk_spans(&reparsed.tree), chunk_spans(&fresh.tree));
    assert!(reparsed.stats.reused_left > 0);
    assert!(reparsed.stats.reused_right > 0);
    assert!(reparsed.stats.matches * 20 < fresh.stats.matches);
}

#[test]
fn deletion_reuses_right_side() {
    let g = grammar(PARENS);
    let old = "(ab) ".repeat(4000);
    let new = format!("{}{}", &old[..10_000], &old[10_005..]);
    let fresh = parse(&g, &new);

    let old_tree = parse(&g, &old).tree;
    let reparsed = reparse(&g, old_tree, &new, Some(Edit::delete(10_000, 10_005)));

    assert_eq!(reparsed.tree, fresh.tree);
    assert!(reparsed.stats.reused_right > 0);
    assert!(reparsed.stats.matches * 5 < fresh.stats.matches);
}

#[test]
fn edit_after_backtracking_match_is_reread() {
    let g = grammar(
        r#"{
            "name": "t",
            "root": [
                { "match": "ab{0,500}c", "node": "Long" },
                { "literal": "a", "node": "Short" },
                { "literal": "b", "node": "B" }
            ]
        }"#,
    );
    let old = format!("a{}d", "b".repeat(200));
    let new = format!("a{}c", "b".repeat(200));
    let fresh = parse(&g, &new);
    assert_eq!(names(&g, &fresh.tree), ["Long@0..202"]);

    let old_tree = parse(&g, &old).tree;
    let reparsed = reparse(&g, old_tree, &new, Some(Edit::replace(201, 202, 1)));

    assert_eq!(reparsed.tree, fresh.tree);
}

#[test]
fn edit_under_lookahead_is_reread() {
    let g = grammar(
        r#"{
            "name": "t",
            "root": [
                { "match": "[a-z]", "node": "Before", "lookahead": "[a-z]*X" },
                { "match": "[a-z]", "node": "Letter" },
                { "literal": "-", "node": "Dash" },
                { "literal": "X", "node": "Mark" },
                { "literal": "Y", "node": "Other" }
            ]
        }"#,
    );
    let old = format!("{}-{}X", "a".repeat(1500), "a".repeat(300));
    let new = format!("{}-{}Y", "a".repeat(1500), "a".repeat(300));
    let fresh = parse(&g, &new);

    let old_tree = parse(&g, &old).tree;
    assert_eq!(names(&g, &old_tree)[1501], "Before@1501..1502");
    let reparsed = reparse(&g, old_tree, &new, Some(Edit::replace(1801, 1802, 1)));

    assert_eq!(reparsed.tree, fresh.tree);
    assert_eq!(names(&g, &reparsed.tree)[1501], "Letter@1501..1502");
    // Steps far enough before the edit never saw it.
    assert!(reparsed.stats.reused_left > 0);
}

#[test]
fn right_reuse_counts_kept_chunks() {
    let g = grammar(PARENS);
    let config = ParseConfig::new().margin_before(0).margin_after(8);
    let old = "(ab) ".repeat(4);
    let new = insert(&old, 2, "x");
    let fresh = parse(&g, &new);

    let old_tree = Parser::new(&g, old.as_str(), TreeBuilder)
        .config(config)
        .parse()
        .tree;
    let fragment = TreeFragment::new(Arc::new(old_tree), 0, old.len());
    let reparsed = Parser::new(&g, new.as_str(), TreeBuilder)
        .config(config)
        .reuse(vec![fragment], Some(Edit::insert(2, 1)))
        .parse();

    assert_eq!(reparsed.tree, fresh.tree);
    assert_eq!(chunk_spans(&reparsed.tree), chunk_spans(&fresh.tree));
    // Seven chunks are spliced at 5; the last one is parsed again.
    assert_eq!(reparsed.stats.reused_right, 6);
    assert_eq!(reparsed.stats.matches, 4);
}

#[test]
fn edit_that_changes_structure() {
    let g = grammar(PARENS);
    let old = "(ab) ".repeat(100);
    let new = insert(&old, 250, "(");
    let fresh = parse(&g, &new);

    let old_tree = parse(&g, &old).tree;
    let reparsed = reparse(&g, old_tree, &new, Some(Edit::insert(250, 1)));

    assert_eq!(reparsed.tree, fresh.tree);
}

#[test]
fn edit_inside_heredoc_keeps_context() {
    let g = grammar(HEREDOC);
    let old = format!("<<EOF\n{}EOF\n", "abc\n".repeat(400));
    let new = insert(&old, 205, "x");
    let fresh = parse(&g, &new);

    let old_tree = parse(&g, &old).tree;
    let reparsed = reparse(&g, old_tree, &new, Some(Edit::insert(205, 1)));

    assert_eq!(reparsed.tree, fresh.tree);
    assert!(reparsed.stats.reused_right > 0);
}

#[test]
fn edit_to_delimiter_invalidates_context() {
    let g = grammar(HEREDOC);
    let old = format!("<<EOF\n{}EOF\nxyz", "abc\n".repeat(30));
    let new = old.replacen("<<EOF", "<<EOX", 1);
    let fresh = parse(&g, &new);

    let old_tree = parse(&g, &old).tree;
    let reparsed = reparse(&g, old_tree, &new, Some(Edit::replace(4, 5, 1)));

    assert_eq!(reparsed.tree, fresh.tree);
    assert_eq!(reparsed.stats.reused_right, 0);
}

#[test]
fn edit_helpers() {
    assert_eq!(Edit::insert(4, 3).offset, 3);
    assert_eq!(Edit::delete(4, 9).offset, -5);
    assert_eq!(Edit::replace(4, 9, 2).offset, -3);
    assert_eq!(Edit::replace(4, 9, 2).new_to(), 6);
    assert!(Edit::insert(4, 0).is_empty());
    assert!(!Edit::replace(4, 5, 1).is_empty());
}
