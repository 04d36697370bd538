use std::sync::Arc;

use weft_core::{NodeId, NodeRecord, RecordKind};
use weft_grammar::GrammarToken;

use crate::chunk_buffer::ChunkBuffer;
use crate::compiler::{CompileStack, Compiler};
use crate::test_utils::{PARENS, grammar};

fn id(raw: u32) -> NodeId {
    NodeId::from_raw(raw)
}

/// Tokenizes `text` into a fresh buffer.
fn tokenize(text: &str) -> ChunkBuffer {
    let g = grammar(PARENS);
    let mut state = g.initial_state();
    let mut buffer = ChunkBuffer::new(64);
    let mut pos = 0;
    while let Some(result) = g.match_at(&state, text, pos) {
        for (i, token) in result.tokens.iter().enumerate() {
            buffer.add((i == 0).then_some(&state), token);
        }
        pos += result.length;
        state = result.state;
    }
    buffer
}

#[test]
fn close_discards_inner_frames() {
    let mut records = Vec::new();
    let mut stack = CompileStack::new();
    stack.push(id(3), 0);
    stack.push(id(4), 1);
    stack.emit(&mut records, NodeRecord::leaf(id(5), 1, 2));

    assert!(stack.close(&mut records, id(3), 3));
    assert!(stack.is_empty());
    assert_eq!(
        records,
        [
            NodeRecord::leaf(id(5), 1, 2),
            NodeRecord::parent(id(3), 0, 3, 1),
        ]
    );
}

#[test]
fn close_picks_most_recent_frame() {
    let mut records = Vec::new();
    let mut stack = CompileStack::new();
    stack.push(id(3), 0);
    stack.emit(&mut records, NodeRecord::leaf(id(5), 0, 1));
    stack.push(id(3), 1);
    stack.emit(&mut records, NodeRecord::leaf(id(5), 1, 2));

    assert!(stack.close(&mut records, id(3), 2));
    assert_eq!(stack.len(), 1);
    assert_eq!(records[2], NodeRecord::parent(id(3), 1, 2, 1));
}

#[test]
fn stray_close_is_ignored() {
    let mut records = Vec::new();
    let mut stack = CompileStack::new();

    assert!(!stack.close(&mut records, id(3), 2));
    assert!(records.is_empty());
}

#[test]
fn finish_marks_incomplete_frames() {
    let mut records = Vec::new();
    let mut stack = CompileStack::new();
    stack.push(id(3), 0);
    stack.emit(&mut records, NodeRecord::leaf(id(5), 0, 2));
    stack.finish(&mut records, 2, true);

    assert_eq!(
        records,
        [
            NodeRecord::leaf(id(5), 0, 2),
            NodeRecord::leaf(NodeId::INCOMPLETE, 2, 2),
            NodeRecord::parent(id(3), 0, 2, 2),
        ]
    );
}

#[test]
fn finish_can_drop_frames() {
    let mut records = Vec::new();
    let mut stack = CompileStack::new();
    stack.push(id(3), 0);
    stack.push(id(4), 0);
    stack.emit(&mut records, NodeRecord::leaf(id(5), 0, 2));
    stack.finish(&mut records, 2, false);

    assert_eq!(records, [NodeRecord::leaf(id(5), 0, 2)]);
    assert!(stack.is_empty());
}

#[test]
fn balanced_chunk_is_reused() {
    let mut buffer = tokenize("(ab)");
    let compiled = Compiler::new().compile(&mut buffer, 4);

    assert_eq!(compiled.records, [NodeRecord::reused(0, 0, 4)]);
    let subtree = &compiled.reused[0];
    assert_eq!(subtree.length, 4);
    assert_eq!(subtree.records.len(), 4);
    assert_eq!(subtree.records[3], NodeRecord::parent(id(3), 0, 4, 3));
}

#[test]
fn subtree_is_cached_on_the_chunk() {
    let mut buffer = tokenize("(ab)");
    let first = Compiler::new().compile(&mut buffer, 4);
    let second = Compiler::new().compile(&mut buffer, 4);

    assert!(Arc::ptr_eq(&first.reused[0], &second.reused[0]));
}

#[test]
fn reused_subtrees_are_relative() {
    let mut buffer = tokenize("x (ab)");
    let compiled = Compiler::new().compile(&mut buffer, 6);

    assert_eq!(compiled.records.last(), Some(&NodeRecord::reused(0, 2, 6)));
    assert_eq!(
        compiled.reused[0].records[0],
        NodeRecord::leaf(id(4), 0, 1)
    );
}

#[test]
fn unterminated_region() {
    let mut buffer = tokenize("(ab");
    let compiled = Compiler::new().compile(&mut buffer, 3);

    let kinds: Vec<_> = compiled.records.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        [
            RecordKind::Node(id(4)),
            RecordKind::Node(id(7)),
            RecordKind::Node(NodeId::INCOMPLETE),
            RecordKind::Node(id(3)),
        ]
    );
    assert_eq!(compiled.records[3], NodeRecord::parent(id(3), 0, 3, 3));
}

#[test]
fn unterminated_region_without_marker() {
    let mut buffer = tokenize("(ab");
    let compiled = Compiler::new()
        .close_incomplete(false)
        .compile(&mut buffer, 3);

    assert_eq!(
        compiled.records,
        [NodeRecord::leaf(id(4), 0, 1), NodeRecord::leaf(id(7), 1, 3)]
    );
}

#[test]
fn single_token_chunks_are_inlined() {
    let mut buffer = ChunkBuffer::new(64);
    let state = grammar(PARENS).initial_state();
    buffer.add(Some(&state), &GrammarToken::new(Some(id(6)), 0, 2));
    let compiled = Compiler::new().compile(&mut buffer, 2);

    assert_eq!(compiled.records, [NodeRecord::leaf(id(6), 0, 2)]);
    assert!(compiled.reused.is_empty());
}
