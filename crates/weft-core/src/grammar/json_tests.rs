use indoc::indoc;

use super::*;

const PARENS: &str = indoc! {r##"
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

#[test]
fn parse_minimal_grammar() {
    let json = r#"{ "name": "test", "root": [{ "literal": "x", "node": "X" }] }"#;

    let grammar = GrammarDef::from_json(json).unwrap();
    assert_eq!(grammar.name, "test");
    assert!(!grammar.ignore_case);
    assert_eq!(grammar.root.len(), 1);
    assert!(matches!(
        &grammar.root[0],
        ItemDef::Rule(RuleDef { pattern: PatternDef::Literal(s), .. }) if s == "x"
    ));
}

#[test]
fn parse_region_with_includes() {
    let grammar = GrammarDef::from_json(PARENS).unwrap();

    assert_eq!(grammar.root[0], ItemDef::Include("paren".into()));
    let Some(EntryDef::Item(ItemDef::Region(region))) = grammar.entry("paren") else {
        panic!("paren should be a region");
    };
    assert_eq!(region.node.as_deref(), Some("Paren"));
    assert_eq!(region.end.len(), 1);
    assert_eq!(
        region.patterns,
        [ItemDef::Include("paren".into()), ItemDef::Include("body".into())]
    );
}

#[test]
fn preserves_repository_order() {
    let grammar = GrammarDef::from_json(PARENS).unwrap();

    let names: Vec<_> = grammar.repository.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["paren", "body", "word", "space"]);
}

#[test]
fn repository_list_entry() {
    let json = r##"{
        "name": "test",
        "root": ["#values"],
        "repository": {
            "values": [{ "match": "[0-9]+" }, { "lookup": ["true", "false"], "node": "Bool" }]
        }
    }"##;

    let grammar = GrammarDef::from_json(json).unwrap();
    let Some(EntryDef::List(items)) = grammar.entry("values") else {
        panic!("values should be a list");
    };
    assert_eq!(items.len(), 2);
}

#[test]
fn parse_guards_captures_and_setters() {
    let json = r##"{
        "name": "test",
        "context": { "delim": "" },
        "root": [{
            "match": "<<(\\w+)",
            "node": "HeredocStart",
            "lookbehind": "!\\\\",
            "lookahead": "\\n",
            "captures": { "1": "Delim", "0": { "function": "check" } },
            "context": [
                { "set": "delim", "to": "$1" },
                { "set": "delim", "if": "$delim", "equals": "EOF", "immediate": true }
            ]
        }]
    }"##;

    let grammar = GrammarDef::from_json(json).unwrap();
    let ItemDef::Rule(rule) = &grammar.root[0] else {
        panic!("expected a rule");
    };

    assert_eq!(
        rule.lookbehind,
        Some(GuardDef {
            pattern: "\\\\".into(),
            negate: true
        })
    );
    assert_eq!(rule.lookahead.as_ref().map(|g| g.negate), Some(false));
    assert_eq!(
        rule.captures,
        [
            (0, CaptureDef::Function("check".into())),
            (1, CaptureDef::Node("Delim".into()))
        ]
    );
    assert_eq!(rule.context[0].value.as_deref(), Some("$1"));
    assert_eq!(rule.context[0].condition, None);
    assert_eq!(
        rule.context[1].condition,
        Some(ConditionDef {
            subject: Some("$delim".into()),
            test: ConditionTest::Equals("EOF".into())
        })
    );
    assert!(rule.context[1].immediate);
    assert_eq!(grammar.context, [("delim".to_owned(), String::new())]);
}

#[test]
fn setter_with_only_if_tests_non_empty() {
    let json = r#"{
        "name": "test",
        "root": [{ "match": "x", "context": [{ "set": "seen", "to": "yes", "if": "$seen" }] }]
    }"#;

    let grammar = GrammarDef::from_json(json).unwrap();
    let ItemDef::Rule(rule) = &grammar.root[0] else {
        panic!("expected a rule");
    };
    assert_eq!(
        rule.context[0].condition.as_ref().map(|c| &c.test),
        Some(&ConditionTest::NonEmpty)
    );
}

#[test]
fn rejects_rule_without_matcher() {
    let json = r#"{ "name": "test", "root": [{ "node": "X" }] }"#;

    let err = GrammarDef::from_json(json).unwrap_err();
    assert_eq!(
        err.to_string(),
        "root[0]: rule needs exactly one of `match`, `literal`, `lookup`"
    );
}

#[test]
fn rejects_rule_with_two_matchers() {
    let json = r#"{ "name": "test", "root": [{ "match": "x", "literal": "x" }] }"#;

    let err = GrammarDef::from_json(json).unwrap_err();
    assert!(matches!(err, GrammarDefError::Shape { .. }));
}

#[test]
fn rejects_include_without_hash() {
    let json = r#"{ "name": "test", "root": ["word"] }"#;

    let err = GrammarDef::from_json(json).unwrap_err();
    assert_eq!(
        err.to_string(),
        "root[0]: expected a `#name` include, found `word`"
    );
}

#[test]
fn rejects_region_without_end() {
    let json = r#"{ "name": "test", "root": [{ "begin": { "literal": "(" } }] }"#;

    let err = GrammarDef::from_json(json).unwrap_err();
    assert_eq!(
        err.to_string(),
        "root[0]: region needs at least one `end` item"
    );
}

#[test]
fn rejects_matcher_on_region() {
    let json = r##"{
        "name": "test",
        "repository": { "r": { "begin": "#b", "end": "#e", "match": "x" } },
        "root": ["#r"]
    }"##;

    let err = GrammarDef::from_json(json).unwrap_err();
    assert_eq!(
        err.to_string(),
        "repository.r: `match` is not allowed on a region; move it to `begin`"
    );
}

#[test]
fn rejects_bad_capture_key() {
    let json = r#"{ "name": "test", "root": [{ "match": "(x)", "captures": { "one": "X" } }] }"#;

    let err = GrammarDef::from_json(json).unwrap_err();
    assert_eq!(
        err.to_string(),
        "root[0].captures: capture key `one` is not a group index"
    );
}

#[test]
fn rejects_unknown_top_level_field() {
    let json = r#"{ "name": "test", "root": [], "rules": {} }"#;

    let err = GrammarDef::from_json(json).unwrap_err();
    assert!(matches!(err, GrammarDefError::Json(_)));
}

#[test]
fn parse_nodes_table() {
    let json = r#"{
        "name": "test",
        "root": [{ "match": "[a-z]+", "node": "Ident" }],
        "nodes": { "Ident": { "autocomplete": "variable" } },
        "fallback": "Text",
        "ignoreCase": true
    }"#;

    let grammar = GrammarDef::from_json(json).unwrap();
    assert!(grammar.ignore_case);
    assert_eq!(grammar.fallback.as_deref(), Some("Text"));
    assert_eq!(
        grammar.node("Ident").and_then(|n| n.autocomplete.as_deref()),
        Some("variable")
    );
}
