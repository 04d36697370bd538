//! Incremental parse driver.
//!
//! A parse runs in cooperative steps. Each [`Parser::advance`] call either
//! matches one grammar step or splices reusable chunks from the previous parse.
//! Reuse works on both sides of an edit:
//!
//! - left: chunks whose match steps never looked at text from the edit on
//!   are kept and parsing resumes from the last restartable one
//! - right: once parsing is past the edit and lands exactly on an old chunk
//!   start with an identical grammar state, the rest of the old buffer is
//!   shifted and appended

use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace};
use weft_core::NodeId;
use weft_grammar::{Grammar, GrammarState, GrammarToken};

use crate::chunk_buffer::{Bias, ChunkBuffer};
use crate::compiler::Compiler;
use crate::config::ParseConfig;
use crate::input::{Input, Region};
use crate::tree::{ChunkSource, TreeSink};

/// A change to the previous document: `[from, to)` in old coordinates was
/// replaced, changing the length by `offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edit {
    pub from: usize,
    pub to: usize,
    pub offset: isize,
}

impl Edit {
    pub fn insert(at: usize, len: usize) -> Self {
        Self {
            from: at,
            to: at,
            offset: len as isize,
        }
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            offset: -((to - from) as isize),
        }
    }

    pub fn replace(from: usize, to: usize, len: usize) -> Self {
        Self {
            from,
            to,
            offset: len as isize - (to - from) as isize,
        }
    }

    /// Nothing changed.
    pub fn is_empty(&self) -> bool {
        self.from == self.to && self.offset == 0
    }

    /// End of the edited range in new coordinates.
    pub fn new_to(&self) -> usize {
        self.to.saturating_add_signed(self.offset)
    }
}

/// A previous tree and the old document range it is valid for.
#[derive(Debug)]
pub struct TreeFragment<T> {
    pub tree: Arc<T>,
    pub from: usize,
    pub to: usize,
}

impl<T> TreeFragment<T> {
    pub fn new(tree: Arc<T>, from: usize, to: usize) -> Self {
        Self { tree, from, to }
    }
}

impl<T> Clone for TreeFragment<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            from: self.from,
            to: self.to,
        }
    }
}

/// Work counters for one parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Grammar steps run.
    pub matches: usize,
    /// Single-character errors forced because the grammar returned nothing.
    pub forced_errors: usize,
    /// Chunks kept before the edit.
    pub reused_left: usize,
    /// Chunks spliced in after the edit and kept.
    pub reused_right: usize,
}

/// Finished parse.
#[derive(Debug)]
pub struct Parsed<T> {
    pub tree: T,
    pub stats: ParseStats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Init,
    Matching,
    Done,
    Stopped,
}

pub struct Parser<'a, I: Input + ?Sized, S: TreeSink> {
    grammar: &'a Grammar,
    input: &'a I,
    sink: S,
    config: ParseConfig,
    region: Region,
    fragments: Vec<TreeFragment<S::Tree>>,
    edit: Option<Edit>,
    stage: Stage,
    start: usize,
    end: usize,
    pos: usize,
    stop: Option<usize>,
    state: GrammarState,
    buffer: ChunkBuffer,
    /// Latest restartable chunk of `buffer` known to the driver.
    checkpoint: Option<usize>,
    previous_right: Option<ChunkBuffer>,
    stats: ParseStats,
}

impl<'a, I: Input + ?Sized, S: TreeSink> Parser<'a, I, S> {
    pub fn new(grammar: &'a Grammar, input: &'a I, sink: S) -> Self {
        let config = ParseConfig::default();
        Self {
            grammar,
            input,
            sink,
            config,
            region: Region::whole(input.len()),
            fragments: Vec::new(),
            edit: None,
            stage: Stage::Init,
            start: 0,
            end: 0,
            pos: 0,
            stop: None,
            state: grammar.initial_state(),
            buffer: ChunkBuffer::new(config.chunk_capacity),
            checkpoint: None,
            previous_right: None,
            stats: ParseStats::default(),
        }
    }

    pub fn config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self.buffer.set_capacity(config.chunk_capacity);
        self
    }

    /// Restricts the parse to `ranges`, parsed as one logical text.
    pub fn ranges(mut self, ranges: Vec<Range<usize>>) -> Self {
        let input = self.input;
        let ranges = ranges
            .into_iter()
            .map(|r| input.floor_boundary(r.start)..input.floor_boundary(r.end))
            .collect();
        self.region = Region::new(ranges);
        self
    }

    /// Reuses chunks attached to `fragments` of the previous parse. Without
    /// an edit the document is taken as unchanged.
    pub fn reuse(mut self, fragments: Vec<TreeFragment<S::Tree>>, edit: Option<Edit>) -> Self {
        self.fragments = fragments;
        self.edit = edit;
        self
    }

    /// Finalizes the parse once it reaches `pos`.
    pub fn stop_at(&mut self, pos: usize) {
        self.stop = Some(pos);
    }

    pub fn parsed_pos(&self) -> usize {
        self.pos
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Done | Stage::Stopped)
    }

    /// Runs one step. Returns the tree on the step that finishes the parse.
    pub fn advance(&mut self) -> Option<S::Tree> {
        match self.stage {
            Stage::Init => {
                self.init();
                None
            }
            Stage::Matching => {
                if self.stop.is_some_and(|stop| self.pos >= stop) {
                    self.stage = Stage::Stopped;
                    return Some(self.finish());
                }
                if self.pos >= self.end {
                    self.stage = Stage::Done;
                    return Some(self.finish());
                }
                if !self.reuse_right() {
                    self.step();
                }
                None
            }
            Stage::Done | Stage::Stopped => None,
        }
    }

    pub fn parse(mut self) -> Parsed<S::Tree> {
        loop {
            if let Some(tree) = self.advance() {
                return Parsed {
                    tree,
                    stats: self.stats,
                };
            }
        }
    }

    fn init(&mut self) {
        self.stage = Stage::Matching;
        self.start = self.region.start();
        self.end = self.region.end();
        self.pos = self.start;

        let edit = *self
            .edit
            .get_or_insert_with(|| Edit::insert(self.input.len(), 0));
        let fragments = std::mem::take(&mut self.fragments);
        let Some(old) = fragments
            .iter()
            .filter(|f| f.from <= self.start && self.start <= f.to)
            .find_map(|f| f.tree.chunks())
        else {
            return;
        };
        let old = ChunkBuffer::clone(old);

        // A chunk is stale once any step behind it read up to the edit. An
        // insertion right at a step's read limit still changes what it saw.
        let bound = if edit.is_empty() {
            edit.from + 1
        } else {
            edit.from
        };
        let stale = old
            .first_reaching(bound)
            .unwrap_or(old.len().saturating_sub(1));
        let split = old
            .restart_point(stale)
            .filter(|&index| old.chunks()[index].from >= self.start);
        let Some(index) = split else {
            self.previous_right = Some(old);
            return;
        };

        let (mut left, right) = old.split(index);
        left.set_capacity(self.config.chunk_capacity);
        if let Some(chunk) = left.last()
            && let Some(state) = &chunk.state
        {
            self.state = state.clone();
            self.pos = chunk.from;
        }
        self.stats.reused_left = index;
        debug!(pos = self.pos, chunks = index, "reusing chunks before edit");
        self.buffer = left;
        self.checkpoint = Some(index);
        self.previous_right = Some(right);
    }

    /// Splices the previous buffer back in once parsing is past the edit and
    /// in sync with it.
    fn reuse_right(&mut self) -> bool {
        let (Some(right), Some(edit)) = (&self.previous_right, self.edit) else {
            return false;
        };
        let Some(old_pos) = self.pos.checked_add_signed(-edit.offset) else {
            return false;
        };
        if old_pos > right.end() {
            self.previous_right = None;
            return false;
        }
        if self.pos < edit.new_to() + self.config.margin_before {
            return false;
        }
        let Some(index) = right.search(old_pos, Bias::Nearest, true) else {
            return false;
        };
        if right.chunks()[index].state.as_ref() != Some(&self.state) {
            return false;
        }

        let Some(mut right) = self.previous_right.take() else {
            return false;
        };
        right.slide(index, edit.offset, true);
        let linked = self.buffer.link(right, self.end);
        let spliced = self.buffer.len() - linked;

        // The spliced tail may stop short of the end; resume from its last
        // restart point, or from the last one before it.
        let restart = (spliced..self.buffer.len())
            .rev()
            .find(|&i| self.buffer.chunks()[i].is_restartable())
            .or(self.checkpoint.filter(|&i| i < spliced));
        let kept = restart.map_or(0, |index| index.saturating_sub(spliced));
        self.stats.reused_right += kept;
        debug!(pos = self.pos, linked, kept, "reusing chunks after edit");

        match restart {
            Some(index) => {
                let (left, _) = self.buffer.split(index);
                if let Some(chunk) = left.last()
                    && let Some(state) = &chunk.state
                {
                    self.pos = chunk.from;
                    self.state = state.clone();
                }
                self.buffer = left;
                self.checkpoint = Some(index);
            }
            None => {
                self.buffer = ChunkBuffer::new(self.config.chunk_capacity);
                self.checkpoint = None;
                self.pos = self.start;
                self.state = self.grammar.initial_state();
            }
        }
        true
    }

    fn step(&mut self) {
        let window = self.region.window(
            self.input,
            self.pos,
            self.config.margin_before,
            self.config.margin_after,
        );
        let at = window.position(self.pos);
        let first = self.buffer.len().saturating_sub(1);
        let reach = window.document_end(window.text().len());

        let result = self
            .grammar
            .match_at(&self.state, window.text(), at)
            .filter(|result| {
                self.region.clamp(window.document_start(at + result.length)) > self.pos
            });
        let Some(result) = result else {
            self.force_error();
            self.buffer.extend_reach(first, reach);
            return;
        };
        self.stats.matches += 1;
        let next = self.region.clamp(window.document_start(at + result.length));

        for (i, token) in result.tokens.iter().enumerate() {
            let from = window.document_start(token.from);
            let mapped = GrammarToken {
                from,
                to: window.document_end(token.to).max(from),
                ..token.clone()
            };
            let state = (i == 0).then_some(&self.state);
            if self.buffer.add(state, &mapped) {
                self.update_checkpoint();
            }
        }
        self.buffer.extend_reach(first, reach);
        trace!(pos = self.pos, next, reach, tokens = result.tokens.len(), "step");

        self.pos = next;
        self.state = result.state;
    }

    fn force_error(&mut self) {
        let text = self.input.read(self.pos, self.pos + 4);
        let len = text.chars().next().map_or(1, char::len_utf8);
        let to = self.pos + len;

        self.stats.forced_errors += 1;
        let token = GrammarToken::new(Some(NodeId::ERROR), self.pos, to);
        if self.buffer.add(Some(&self.state), &token) {
            self.update_checkpoint();
        }
        self.pos = self.region.clamp(to);
    }

    fn update_checkpoint(&mut self) {
        let latest = self
            .buffer
            .len()
            .checked_sub(1)
            .and_then(|last| self.buffer.restart_point(last));
        if latest.is_some() {
            self.checkpoint = latest;
        }
    }

    fn finish(&mut self) -> S::Tree {
        let mut chunks = std::mem::replace(
            &mut self.buffer,
            ChunkBuffer::new(self.config.chunk_capacity),
        );
        self.previous_right = None;

        let compiled = Compiler::new()
            .close_incomplete(self.config.close_incomplete)
            .compile(&mut chunks, self.pos);
        let mut tree = self
            .sink
            .build(compiled, self.start, self.pos.saturating_sub(self.start));
        self.sink.attach(&mut tree, Arc::new(chunks));

        debug!(
            end = self.pos,
            matches = self.stats.matches,
            reused_left = self.stats.reused_left,
            reused_right = self.stats.reused_right,
            "parse finished"
        );
        tree
    }
}
