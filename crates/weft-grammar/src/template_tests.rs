use std::collections::BTreeMap;
use std::sync::Arc;

use weft_core::Symbol;

use crate::state::{ContextTable, GrammarState};
use crate::template::Template;

fn resolve(name: &str) -> Option<Symbol> {
    match name {
        "delim" => Some(Symbol::from_raw(0)),
        "depth" => Some(Symbol::from_raw(1)),
        _ => None,
    }
}

fn state() -> GrammarState {
    let context = BTreeMap::from([(Symbol::from_raw(0), "EOF".to_owned())]);
    GrammarState::new(Arc::new(BTreeMap::new()), ContextTable::new(context))
}

fn expand(source: &str, groups: &[Option<&str>]) -> String {
    Template::parse(source, resolve)
        .unwrap()
        .expand(&state(), groups)
}

#[test]
fn plain_text() {
    assert_eq!(expand("abc", &[]), "abc");
    assert_eq!(expand("", &[]), "");
}

#[test]
fn variables() {
    assert_eq!(expand("<$delim>", &[]), "<EOF>");
    assert_eq!(expand("$depth", &[]), "");
}

#[test]
fn groups() {
    let groups = [Some("a=1"), Some("a"), None];
    assert_eq!(expand("$1:$0", &groups), "a:a=1");
    assert_eq!(expand("$2$9", &groups), "");
}

#[test]
fn dollar_escapes() {
    assert_eq!(expand("$$delim", &[]), "$delim");
    assert_eq!(expand("cost $ 5", &[]), "cost $ 5");
    assert_eq!(expand("end$", &[]), "end$");
}

#[test]
fn unknown_variable() {
    assert_eq!(Template::parse("x$nope", resolve), Err("nope".to_owned()));
}
