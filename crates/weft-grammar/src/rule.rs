//! Compiled rules.

use std::sync::Arc;

use weft_core::NodeId;

use crate::context::Setter;
use crate::grammar::Grammar;
use crate::matched::Matched;
use crate::matcher::Matcher;
use crate::state::GrammarState;

/// Verdict of a capture function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureVerdict {
    /// Accept the capture without a node.
    Keep,
    /// Reject the whole match.
    Veto,
    /// Accept the capture as this node.
    Node(NodeId),
}

/// Receives the captured text and the working state.
pub type CaptureFn = Arc<dyn Fn(&str, &GrammarState) -> CaptureVerdict + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capture {
    Node(NodeId),
    /// Index into the grammar's capture functions.
    Function(usize),
}

/// Zero-width guard.
#[derive(Debug)]
pub struct Guard {
    pub matcher: Matcher,
    pub negate: bool,
}

#[derive(Debug)]
pub struct Rule {
    /// Definition path, for diagnostics and dumps.
    pub path: String,
    pub node: Option<NodeId>,
    pub matcher: Matcher,
    /// Compiled with a trailing `$`, tested against the text before the match.
    pub lookbehind: Option<Guard>,
    /// Tested anchored at the match end.
    pub lookahead: Option<Guard>,
    pub captures: Vec<(usize, Capture)>,
    pub setters: Vec<Setter>,
    pub rematch: bool,
}

impl Rule {
    /// Tries the rule at `pos`.
    ///
    /// Immediate setters mutate `state` even when the rule then fails;
    /// deferred setters only run on success.
    pub fn exec(
        &self,
        grammar: &Grammar,
        state: &mut GrammarState,
        text: &str,
        pos: usize,
    ) -> Option<Matched> {
        if let Some(guard) = &self.lookbehind
            && guard.matcher.find(&text[..pos], state.context()) == guard.negate
        {
            return None;
        }

        for setter in self.setters.iter().filter(|s| s.immediate) {
            setter.apply(state, &[]);
        }

        let output = self.matcher.exec(text, pos, state.context())?;
        if output.is_empty() && !self.rematch {
            return None;
        }
        let end = pos + output.len();

        if let Some(guard) = &self.lookahead
            && guard.matcher.test(text, end, state.context()) == guard.negate
        {
            return None;
        }

        let mut children = Vec::new();
        if let Some(spans) = &output.captures {
            for &(index, capture) in &self.captures {
                let Some(span) = spans.get(index).cloned().flatten() else {
                    continue;
                };
                let node = match capture {
                    Capture::Node(node) => Some(node),
                    Capture::Function(f) => {
                        let verdict = grammar.capture_fn(f);
                        match verdict(&output.total[span.clone()], state) {
                            CaptureVerdict::Keep => None,
                            CaptureVerdict::Veto => return None,
                            CaptureVerdict::Node(node) => Some(node),
                        }
                    }
                };
                if let Some(node) = node {
                    children.push(Matched::new(Some(node), pos + span.start, span.len()));
                }
            }
        }

        let groups = output.groups();
        for setter in self.setters.iter().filter(|s| !s.immediate) {
            setter.apply(state, &groups);
        }

        if self.rematch {
            return Some(Matched::new(None, pos, 0));
        }
        Some(Matched::new(self.node, pos, output.len()).with_children(children))
    }
}
