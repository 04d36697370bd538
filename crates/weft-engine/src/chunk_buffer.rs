//! Position-ordered chunk list.

use weft_grammar::{GrammarState, GrammarToken};

use crate::chunk::Chunk;

/// Which neighbour [`ChunkBuffer::search`] picks when no chunk starts exactly
/// at the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i8)]
pub enum Bias {
    Before = -1,
    Nearest = 0,
    After = 1,
}

/// Chunks in strictly increasing `from` order, never overlapping.
#[derive(Clone, Debug)]
pub struct ChunkBuffer {
    chunks: Vec<Chunk>,
    capacity: usize,
}

impl ChunkBuffer {
    /// `capacity` is the token count after which a match boundary starts a
    /// new chunk.
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn chunks_mut(&mut self) -> &mut [Chunk] {
        &mut self.chunks
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn last(&self) -> Option<&Chunk> {
        self.chunks.last()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    /// End of the last chunk.
    pub fn end(&self) -> usize {
        self.chunks.last().map_or(0, Chunk::to)
    }

    /// Ingests one token.
    ///
    /// `state` is the grammar state at `token.from` when the token starts a
    /// match step, `None` for the later tokens of the same step. Returns
    /// whether a chunk boundary was created, either by this token starting a
    /// chunk or by its close actions ending one. The driver uses it to know
    /// when a newer restart point may exist.
    pub fn add(&mut self, state: Option<&GrammarState>, token: &GrammarToken) -> bool {
        let (push, mut boundary) = match self.chunks.last_mut() {
            None => (true, true),
            Some(last) if last.is_pending() => {
                last.from = token.from;
                last.state = state.cloned();
                (false, true)
            }
            Some(last) => {
                let full = state.is_some() && last.tokens().len() >= self.capacity;
                let split = !token.open.is_empty() || full;
                (split, split)
            }
        };
        if push {
            self.chunks.push(Chunk::new(token.from, state.cloned()));
        }

        let index = self.chunks.len() - 1;
        let last = &mut self.chunks[index];
        for &id in &token.open {
            last.push_open(id);
        }
        match token.id {
            Some(id) => last.add(id, token.from, token.to),
            None => last.cover(token.to),
        }
        if !token.close.is_empty() {
            for &id in &token.close {
                last.push_close(id);
            }
            self.chunks.push(Chunk::new(token.to, None));
            boundary = true;
        }

        boundary
    }

    /// Splits at `index`. The left part keeps chunks `[0..=index]` with the
    /// last one emptied, so parsing can resume from its state. The right part
    /// holds chunks `[index..]`.
    pub fn split(&self, index: usize) -> (ChunkBuffer, ChunkBuffer) {
        let mut left = self.chunks[..=index].to_vec();
        if let Some(last) = left.last_mut() {
            *last = last.stripped();
        }
        let right = self.chunks[index..].to_vec();
        (
            Self {
                chunks: left,
                capacity: self.capacity,
            },
            Self {
                chunks: right,
                capacity: self.capacity,
            },
        )
    }

    /// Shifts chunks at and after `index` by `offset`, dropping the ones
    /// before `index` when `cut_left` is set.
    pub fn slide(&mut self, index: usize, offset: isize, cut_left: bool) {
        for chunk in &mut self.chunks[index..] {
            chunk.shift(offset);
        }
        if cut_left {
            self.chunks.drain(..index);
        }
    }

    /// Records that a step touching chunks `[index..]` looked at text up to
    /// `reach`. A trailing pending chunk is left alone: its state comes from
    /// that step, so the mark goes on the chunk before it.
    pub(crate) fn extend_reach(&mut self, index: usize, reach: usize) {
        let end = match self.chunks.last() {
            Some(last) if last.is_pending() => self.chunks.len() - 1,
            _ => self.chunks.len(),
        };
        let start = index.min(end.saturating_sub(1));
        for chunk in self.chunks.get_mut(start..end).into_iter().flatten() {
            chunk.extend_reach(reach);
        }
    }

    /// First chunk whose tokens depend on text at or after `pos`.
    pub fn first_reaching(&self, pos: usize) -> Option<usize> {
        self.chunks.iter().position(|chunk| chunk.reach() >= pos)
    }

    /// Appends `right`, stopping before the first chunk that ends past `max`.
    /// Returns the number of chunks taken over.
    pub fn link(&mut self, right: ChunkBuffer, max: usize) -> usize {
        if self.chunks.last().is_some_and(Chunk::is_pending) {
            self.chunks.pop();
        }
        let before = self.chunks.len();
        self.chunks
            .extend(right.chunks.into_iter().take_while(|chunk| chunk.to() <= max));
        self.chunks.len() - before
    }

    /// Binary search by chunk start. An exact hit wins regardless of `bias`;
    /// `precise` rejects anything else.
    pub fn search(&self, pos: usize, bias: Bias, precise: bool) -> Option<usize> {
        let after = self.chunks.partition_point(|chunk| chunk.from <= pos);
        if after > 0 && self.chunks[after - 1].from == pos {
            return Some(after - 1);
        }
        if precise {
            return None;
        }

        let before = after.checked_sub(1);
        let next = (after < self.chunks.len()).then_some(after);
        match bias {
            Bias::Before => before,
            Bias::After => next,
            Bias::Nearest => match (before, next) {
                (Some(b), Some(n)) => {
                    if pos - self.chunks[b].from <= self.chunks[n].from - pos {
                        Some(b)
                    } else {
                        Some(n)
                    }
                }
                (b, n) => b.or(n),
            },
        }
    }

    /// Closest restartable chunk at or before `index`.
    pub fn restart_point(&self, index: usize) -> Option<usize> {
        let end = index.min(self.chunks.len().checked_sub(1)?);
        (0..=end).rev().find(|&i| self.chunks[i].is_restartable())
    }
}
