//! A run of tokens sharing one cached start state.

use std::sync::Arc;

use weft_core::{NodeId, Subtree};
use weft_grammar::GrammarState;

/// Token with positions relative to its chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkToken {
    pub id: NodeId,
    pub from: u32,
    pub to: u32,
}

/// Bounded run of tokens.
///
/// Open actions only ever sit on the first token and close actions on the
/// last one: the buffer starts a new chunk around them. `state` is the grammar
/// state right before the first token, `None` when the chunk starts in the
/// middle of a match step and parsing cannot restart there. `reach` is the
/// furthest document position any step producing the chunk looked at.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub from: usize,
    pub length: usize,
    tokens: Vec<ChunkToken>,
    open: Vec<NodeId>,
    close: Vec<NodeId>,
    pub state: Option<GrammarState>,
    reach: usize,
    subtree: Option<Arc<Subtree>>,
}

impl Chunk {
    pub fn new(from: usize, state: Option<GrammarState>) -> Self {
        Self {
            from,
            length: 0,
            tokens: Vec::new(),
            open: Vec::new(),
            close: Vec::new(),
            state,
            reach: from,
            subtree: None,
        }
    }

    pub fn to(&self) -> usize {
        self.from + self.length
    }

    /// End of the text the chunk's tokens depend on. An edit at or before
    /// this position may change them.
    pub fn reach(&self) -> usize {
        self.reach.max(self.to())
    }

    pub(crate) fn extend_reach(&mut self, reach: usize) {
        self.reach = self.reach.max(reach);
    }

    /// Moves the chunk and everything it looked at by `offset`.
    pub(crate) fn shift(&mut self, offset: isize) {
        self.from = self.from.saturating_add_signed(offset);
        self.reach = self.reach.saturating_add_signed(offset);
    }

    pub fn tokens(&self) -> &[ChunkToken] {
        &self.tokens
    }

    pub fn open(&self) -> &[NodeId] {
        &self.open
    }

    pub fn close(&self) -> &[NodeId] {
        &self.close
    }

    /// Appends a token given in document positions.
    pub fn add(&mut self, id: NodeId, from: usize, to: usize) {
        self.tokens.push(ChunkToken {
            id,
            from: (from - self.from) as u32,
            to: (to - self.from) as u32,
        });
        self.cover(to);
    }

    /// Extends the chunk over a silent token ending at `to`.
    pub fn cover(&mut self, to: usize) {
        self.length = self.length.max(to.saturating_sub(self.from));
        self.subtree = None;
    }

    pub fn push_open(&mut self, id: NodeId) {
        self.open.push(id);
        self.subtree = None;
    }

    pub fn push_close(&mut self, id: NodeId) {
        self.close.push(id);
        self.subtree = None;
    }

    /// Nothing recorded yet. A pending chunk takes the position and state of
    /// the next token.
    pub fn is_pending(&self) -> bool {
        self.length == 0 && self.tokens.is_empty() && self.open.is_empty() && self.close.is_empty()
    }

    pub fn is_restartable(&self) -> bool {
        self.state.is_some()
    }

    /// Whether the chunk serializes on its own: every node it opens is also
    /// closed in it.
    pub fn is_memoizable(&self) -> bool {
        self.tokens.len() > 1 && self.open.iter().eq(self.close.iter().rev())
    }

    pub(crate) fn subtree(&self) -> Option<&Arc<Subtree>> {
        self.subtree.as_ref()
    }

    pub(crate) fn set_subtree(&mut self, subtree: Arc<Subtree>) {
        self.subtree = Some(subtree);
    }

    /// Empty copy at the same position and state.
    pub(crate) fn stripped(&self) -> Self {
        Self::new(self.from, self.state.clone())
    }
}
