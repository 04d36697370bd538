//! Chunk buffer to postfix node buffer.

use std::sync::Arc;

use weft_core::{NodeBuffer, NodeId, NodeRecord, Subtree};

use crate::chunk::Chunk;
use crate::chunk_buffer::ChunkBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CompileFrame {
    node: NodeId,
    start: usize,
    /// Records emitted since the frame was pushed.
    size: u32,
}

/// Open nodes during compilation.
#[derive(Debug, Default)]
pub struct CompileStack {
    frames: Vec<CompileFrame>,
}

impl CompileStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId, start: usize) {
        self.frames.push(CompileFrame {
            node,
            start,
            size: 0,
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Appends a record, counting it in every open frame.
    pub fn emit(&mut self, records: &mut Vec<NodeRecord>, record: NodeRecord) {
        records.push(record);
        for frame in &mut self.frames {
            frame.size += 1;
        }
    }

    /// Closes the most recent frame for `node` at `to`. Frames pushed after it
    /// are discarded and their records become its children. Returns false if
    /// no frame for `node` is open.
    pub fn close(&mut self, records: &mut Vec<NodeRecord>, node: NodeId, to: usize) -> bool {
        let Some(index) = self.frames.iter().rposition(|frame| frame.node == node) else {
            return false;
        };
        self.frames.truncate(index + 1);
        let Some(frame) = self.frames.pop() else {
            return false;
        };
        self.emit(
            records,
            NodeRecord::parent(frame.node, frame.start, to, frame.size),
        );
        true
    }

    /// Force-closes every open frame at `end`, innermost first. With
    /// `incomplete` set each one receives a zero-length `INCOMPLETE` marker
    /// and is emitted; otherwise the frames are dropped and their children
    /// stay where they are.
    pub fn finish(&mut self, records: &mut Vec<NodeRecord>, end: usize, incomplete: bool) {
        if !incomplete {
            self.frames.clear();
            return;
        }
        while let Some(frame) = self.frames.last() {
            let node = frame.node;
            self.emit(records, NodeRecord::leaf(NodeId::INCOMPLETE, end, end));
            self.close(records, node, end);
        }
    }
}

/// Compiles chunk buffers into node buffers.
#[derive(Clone, Copy, Debug)]
pub struct Compiler {
    close_incomplete: bool,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            close_incomplete: true,
        }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nodes still open at the end are closed with an `INCOMPLETE`
    /// marker (default) or dropped.
    pub fn close_incomplete(mut self, close: bool) -> Self {
        self.close_incomplete = close;
        self
    }

    /// Compiles every chunk starting before `end`.
    ///
    /// Memoizable chunks are emitted as a single `Reused` record. Their
    /// subtree is cached on the chunk, so a later compilation of a buffer
    /// sharing the chunk skips it.
    pub fn compile(&self, chunks: &mut ChunkBuffer, end: usize) -> NodeBuffer {
        let mut buffer = NodeBuffer::new();
        let mut stack = CompileStack::new();

        for chunk in chunks.chunks_mut() {
            if chunk.from > end {
                break;
            }
            if chunk.is_memoizable() && chunk.to() <= end {
                let subtree = match chunk.subtree() {
                    Some(subtree) => subtree.clone(),
                    None => {
                        let subtree = Arc::new(build_subtree(chunk));
                        chunk.set_subtree(subtree.clone());
                        subtree
                    }
                };
                let index = buffer.add_reused(subtree);
                stack.emit(
                    &mut buffer.records,
                    NodeRecord::reused(index, chunk.from, chunk.to()),
                );
                continue;
            }
            compile_chunk(&mut stack, &mut buffer.records, chunk, chunk.from);
        }

        stack.finish(&mut buffer.records, end, self.close_incomplete);
        buffer
    }
}

fn compile_chunk(stack: &mut CompileStack, records: &mut Vec<NodeRecord>, chunk: &Chunk, base: usize) {
    for &id in chunk.open() {
        stack.push(id, base);
    }
    for token in chunk.tokens() {
        let from = base + token.from as usize;
        let to = base + token.to as usize;
        stack.emit(records, NodeRecord::leaf(token.id, from, to));
    }
    let to = base + chunk.length;
    for &id in chunk.close() {
        stack.close(records, id, to);
    }
}

/// Standalone serialization of a memoizable chunk, positions relative to it.
fn build_subtree(chunk: &Chunk) -> Subtree {
    let mut records = Vec::new();
    let mut stack = CompileStack::new();
    compile_chunk(&mut stack, &mut records, chunk, 0);
    Subtree::new(chunk.length, records)
}
