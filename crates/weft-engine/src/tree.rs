//! Tree construction from node buffers.

use std::fmt::Write as _;
use std::sync::Arc;

use weft_core::{NodeBuffer, NodeId, NodeRecord, RecordKind, Subtree, buffer};
use weft_grammar::Grammar;

use crate::chunk_buffer::ChunkBuffer;

/// Builds trees from compiled node buffers.
pub trait TreeSink {
    type Tree: ChunkSource;

    /// Builds the tree for `[start, start + length)`.
    fn build(&mut self, buffer: NodeBuffer, start: usize, length: usize) -> Self::Tree;

    /// Attaches the chunk buffer a later parse reuses.
    fn attach(&mut self, tree: &mut Self::Tree, chunks: Arc<ChunkBuffer>);
}

/// Trees that carry the chunk buffer they were built from.
pub trait ChunkSource {
    fn chunks(&self) -> Option<&Arc<ChunkBuffer>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeId,
    pub from: usize,
    pub to: usize,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.to == self.from
    }
}

/// Nested tree with reused subtrees expanded, rooted at a `DOCUMENT` node.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    root: SyntaxNode,
    chunks: Option<Arc<ChunkBuffer>>,
}

impl SyntaxTree {
    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Pre-order traversal yielding each node with its depth.
    pub fn walk(&self) -> impl Iterator<Item = (usize, &SyntaxNode)> {
        let mut stack = vec![(0, &self.root)];
        std::iter::from_fn(move || {
            let (depth, node) = stack.pop()?;
            stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
            Some((depth, node))
        })
    }

    /// Innermost node containing `pos`.
    pub fn node_at(&self, pos: usize) -> Option<&SyntaxNode> {
        if pos < self.root.from || pos >= self.root.to {
            return None;
        }
        let mut node = &self.root;
        while let Some(child) = node
            .children
            .iter()
            .find(|child| child.from <= pos && pos < child.to)
        {
            node = child;
        }
        Some(node)
    }

    /// One line per node, indented by depth.
    pub fn dump(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        for (depth, node) in self.walk() {
            let _ = writeln!(
                out,
                "{:indent$}{} {}..{}",
                "",
                grammar.node_name(node.kind),
                node.from,
                node.to,
                indent = depth * 2
            );
        }
        out
    }
}

impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for SyntaxTree {}

impl ChunkSource for SyntaxTree {
    fn chunks(&self) -> Option<&Arc<ChunkBuffer>> {
        self.chunks.as_ref()
    }
}

/// Reference sink producing [`SyntaxTree`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeBuilder;

impl TreeSink for TreeBuilder {
    type Tree = SyntaxTree;

    fn build(&mut self, buffer: NodeBuffer, start: usize, length: usize) -> SyntaxTree {
        let mut children = Vec::new();
        expand(
            &buffer.records,
            &buffer::top_level(&buffer.records),
            0,
            &buffer.reused,
            &mut children,
        );
        SyntaxTree {
            root: SyntaxNode {
                kind: NodeId::DOCUMENT,
                from: start,
                to: start + length,
                children,
            },
            chunks: None,
        }
    }

    fn attach(&mut self, tree: &mut SyntaxTree, chunks: Arc<ChunkBuffer>) {
        tree.chunks = Some(chunks);
    }
}

/// Turns `indices` of `records` into nodes shifted by `offset`. Reused records
/// are replaced by the top-level nodes of their subtree.
fn expand(
    records: &[NodeRecord],
    indices: &[usize],
    offset: usize,
    reused: &[Arc<Subtree>],
    out: &mut Vec<SyntaxNode>,
) {
    for &index in indices {
        let record = &records[index];
        match record.kind {
            RecordKind::Node(kind) => {
                let mut children = Vec::new();
                expand(
                    records,
                    &buffer::children(records, index),
                    offset,
                    reused,
                    &mut children,
                );
                out.push(SyntaxNode {
                    kind,
                    from: record.from + offset,
                    to: record.to + offset,
                    children,
                });
            }
            RecordKind::Reused(subtree) => {
                let Some(subtree) = reused.get(subtree as usize) else {
                    continue;
                };
                expand(
                    &subtree.records,
                    &buffer::top_level(&subtree.records),
                    record.from + offset,
                    reused,
                    out,
                );
            }
        }
    }
}
