use weft_core::NodeId;

use crate::matched::{GrammarToken, Matched};
use crate::node::Wrapping;

fn id(raw: u32) -> NodeId {
    NodeId::from_raw(raw)
}

fn child(node: u32, from: usize, len: usize) -> Matched {
    Matched::new(Some(id(node)), from, len)
}

#[test]
fn leaf_is_one_token() {
    let tokens = Matched::new(Some(id(3)), 2, 3).tokens();

    assert_eq!(tokens, [GrammarToken::new(Some(id(3)), 2, 5)]);
}

#[test]
fn children_cover_the_match() {
    let matched = Matched::new(Some(id(3)), 0, 6).with_children(vec![child(5, 3, 1), child(4, 1, 1)]);
    let tokens = matched.tokens();

    let spans: Vec<_> = tokens.iter().map(|t| (t.id, t.from, t.to)).collect();
    assert_eq!(
        spans,
        [
            (None, 0, 1),
            (Some(id(4)), 1, 2),
            (None, 2, 3),
            (Some(id(5)), 3, 4),
            (None, 4, 6),
        ]
    );
    assert_eq!(tokens[0].open, [id(3)]);
    assert_eq!(tokens[4].close, [id(3)]);
}

#[test]
fn overlapping_and_empty_children_are_skipped() {
    let matched = Matched::new(None, 0, 4).with_children(vec![
        child(4, 0, 3),
        child(5, 1, 1),
        child(6, 3, 0),
    ]);
    let tokens = matched.tokens();

    let spans: Vec<_> = tokens.iter().map(|t| (t.id, t.from, t.to)).collect();
    assert_eq!(spans, [(Some(id(4)), 0, 3), (None, 3, 4)]);
}

#[test]
fn begin_opens_region_before_node() {
    let matched = Matched::new(Some(id(4)), 0, 2)
        .with_children(vec![child(5, 0, 1)])
        .wrap(Wrapping::Begin, Some(id(3)));
    let tokens = matched.tokens();

    assert_eq!(tokens[0].open, [id(3), id(4)]);
    assert!(tokens.iter().all(|t| !t.close.contains(&id(3))));
}

#[test]
fn end_closes_region_after_node() {
    let matched = Matched::new(Some(id(5)), 4, 1).wrap(Wrapping::End, Some(id(3)));
    let tokens = matched.tokens();

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].close, [id(3)]);
    assert!(tokens[0].open.is_empty());
}

#[test]
fn offset_shifts_token() {
    let token = GrammarToken::new(None, 2, 4).offset(10).offset(-1);

    assert_eq!((token.from, token.to), (11, 13));
}
