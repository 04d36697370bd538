//! Match results and their token form.

use weft_core::NodeId;

use crate::node::Wrapping;

/// One matched span plus structural actions.
///
/// `open` ids apply before the token, outermost first. `close` ids apply after
/// it, innermost first. A token without an id is silent: it only carries
/// actions and extent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarToken {
    pub id: Option<NodeId>,
    pub from: usize,
    pub to: usize,
    pub open: Vec<NodeId>,
    pub close: Vec<NodeId>,
}

impl GrammarToken {
    pub fn new(id: Option<NodeId>, from: usize, to: usize) -> Self {
        Self {
            id,
            from,
            to,
            open: Vec::new(),
            close: Vec::new(),
        }
    }

    /// Shifts the token by `delta` (window to document coordinates).
    pub fn offset(mut self, delta: isize) -> Self {
        self.from = self.from.saturating_add_signed(delta);
        self.to = self.to.saturating_add_signed(delta);
        self
    }
}

/// Outcome of one successful rule application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matched {
    pub node: Option<NodeId>,
    pub from: usize,
    pub len: usize,
    /// Capture matches, leaves only.
    pub children: Vec<Matched>,
    pub wrapping: Wrapping,
    /// Region node opened or closed by this match.
    pub region: Option<NodeId>,
}

impl Matched {
    pub fn new(node: Option<NodeId>, from: usize, len: usize) -> Self {
        Self {
            node,
            from,
            len,
            children: Vec::new(),
            wrapping: Wrapping::Full,
            region: None,
        }
    }

    pub fn to(&self) -> usize {
        self.from + self.len
    }

    pub fn with_children(mut self, mut children: Vec<Matched>) -> Self {
        children.sort_by_key(|child| child.from);
        self.children = children;
        self
    }

    /// Marks this match as the begin or end of a region.
    pub fn wrap(mut self, wrapping: Wrapping, region: Option<NodeId>) -> Self {
        self.wrapping = wrapping;
        self.region = region;
        self
    }

    /// Resolves the match into tokens covering `[from, to)` without gaps.
    pub fn tokens(&self) -> Vec<GrammarToken> {
        let to = self.to();
        let mut tokens = Vec::new();

        if self.children.is_empty() {
            tokens.push(GrammarToken::new(self.node, self.from, to));
        } else {
            let mut cursor = self.from;
            for child in &self.children {
                // Nested or overlapping groups keep the first one.
                if child.from < cursor || child.len == 0 {
                    continue;
                }
                if child.from > cursor {
                    tokens.push(GrammarToken::new(None, cursor, child.from));
                }
                tokens.push(GrammarToken::new(child.node, child.from, child.to()));
                cursor = child.to();
            }
            if cursor < to || tokens.is_empty() {
                tokens.push(GrammarToken::new(None, cursor, to));
            }

            if let Some(node) = self.node {
                tokens[0].open.push(node);
                if let Some(last) = tokens.last_mut() {
                    last.close.push(node);
                }
            }
        }

        if let Some(region) = self.region {
            match self.wrapping {
                Wrapping::Begin => tokens[0].open.insert(0, region),
                Wrapping::End => {
                    if let Some(last) = tokens.last_mut() {
                        last.close.push(region);
                    }
                }
                Wrapping::Full => {}
            }
        }

        tokens
    }
}
