//! Flat postfix node buffers.
//!
//! A buffer lists nodes in postfix order: children before their parent. Each
//! record carries the number of records that make up its descendants, so the
//! tree can be rebuilt with a single stack pass. Chunks that serialize on
//! their own are stored once as a [`Subtree`] and referenced by index.

use std::sync::Arc;

use crate::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Node(NodeId),
    /// Index into [`NodeBuffer::reused`].
    Reused(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRecord {
    pub kind: RecordKind,
    pub from: usize,
    pub to: usize,
    /// Records that make up this node's descendants.
    pub size: u32,
}

impl NodeRecord {
    pub fn leaf(id: NodeId, from: usize, to: usize) -> Self {
        Self {
            kind: RecordKind::Node(id),
            from,
            to,
            size: 0,
        }
    }

    pub fn parent(id: NodeId, from: usize, to: usize, size: u32) -> Self {
        Self {
            kind: RecordKind::Node(id),
            from,
            to,
            size,
        }
    }

    pub fn reused(index: u32, from: usize, to: usize) -> Self {
        Self {
            kind: RecordKind::Reused(index),
            from,
            to,
            size: 0,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        match self.kind {
            RecordKind::Node(id) => Some(id),
            RecordKind::Reused(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.to == self.from
    }
}

/// A standalone serialization of one chunk.
///
/// Positions are relative to the chunk start, so the same subtree stays valid
/// after the chunk slides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Subtree {
    pub length: usize,
    pub records: Vec<NodeRecord>,
}

impl Subtree {
    pub fn new(length: usize, records: Vec<NodeRecord>) -> Self {
        Self { length, records }
    }
}

/// Output of one compilation: postfix records plus the subtrees they reference.
#[derive(Clone, Debug, Default)]
pub struct NodeBuffer {
    pub records: Vec<NodeRecord>,
    pub reused: Vec<Arc<Subtree>>,
}

impl NodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: NodeRecord) {
        self.records.push(record);
    }

    /// Registers a subtree and returns the index a `Reused` record refers to.
    pub fn add_reused(&mut self, subtree: Arc<Subtree>) -> u32 {
        self.reused.push(subtree);
        (self.reused.len() - 1) as u32
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Indices of the records not nested in any other record, in document order.
pub fn top_level(records: &[NodeRecord]) -> Vec<usize> {
    let mut roots = Vec::new();
    let mut index = records.len();
    while index > 0 {
        let last = index - 1;
        roots.push(last);
        index = last.saturating_sub(records[last].size as usize);
    }
    roots.reverse();
    roots
}

/// Indices of the direct children of `records[parent]`, in document order.
pub fn children(records: &[NodeRecord], parent: usize) -> Vec<usize> {
    let start = parent - records[parent].size as usize;
    top_level(&records[start..parent])
        .into_iter()
        .map(|i| i + start)
        .collect()
}
