//! The compiled grammar and its one-step match entrypoint.

use tracing::{trace, warn};
use weft_core::{Interner, NodeId};

use crate::matched::{GrammarToken, Matched};
use crate::node::{Node, NodeProps, NodeTable, Wrapping};
use crate::rule::{CaptureFn, Rule};
use crate::state::{ContextTable, Frame, GrammarState, Variables};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub(crate) u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) u32);

impl StateId {
    pub const ROOT: StateId = StateId(0);

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl RuleId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alternative {
    Rule(RuleId),
    /// Region entered through the state's begin rule.
    State(StateId),
}

#[derive(Debug)]
pub struct State {
    pub name: String,
    pub node: Option<NodeId>,
    pub begin: Option<RuleId>,
    /// Tried first while this state is on top of the stack.
    pub end: Vec<RuleId>,
    pub alternatives: Vec<Alternative>,
    pub embedded: Option<String>,
}

/// Bounds on a single match step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchLimits {
    /// Zero-length transitions per step before the default rule is forced
    /// (default: 16).
    pub(crate) rematch_limit: u32,
    /// Maximum number of nested regions (default: 512).
    pub(crate) max_depth: u32,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            rematch_limit: 16,
            max_depth: 512,
        }
    }
}

impl MatchLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rematch_limit(mut self, limit: u32) -> Self {
        self.rematch_limit = limit;
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn get_rematch_limit(&self) -> u32 {
        self.rematch_limit
    }

    pub fn get_max_depth(&self) -> u32 {
        self.max_depth
    }
}

/// Result of one match step.
#[derive(Clone, Debug)]
pub struct MatchResult {
    /// State after the step.
    pub state: GrammarState,
    /// Characters consumed, in bytes. Zero only at the end of the text.
    pub length: usize,
    pub tokens: Vec<GrammarToken>,
}

/// An immutable compiled grammar.
///
/// Built once by [`GrammarBuilder`](crate::GrammarBuilder) and shared
/// read-only between parses.
pub struct Grammar {
    pub(crate) name: String,
    pub(crate) rules: Vec<Rule>,
    pub(crate) states: Vec<State>,
    pub(crate) global: Vec<Alternative>,
    pub(crate) fallback: NodeId,
    pub(crate) nodes: NodeTable,
    pub(crate) interner: Interner,
    pub(crate) variables: Variables,
    pub(crate) initial_context: ContextTable,
    pub(crate) capture_fns: Vec<(String, CaptureFn)>,
    pub(crate) limits: MatchLimits,
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .field("states", &self.states.len())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fresh state at the start of a document.
    pub fn initial_state(&self) -> GrammarState {
        GrammarState::new(self.variables.clone(), self.initial_context.clone())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes.id(name)
    }

    /// Node name, `?` for ids outside the table.
    pub fn node_name(&self, id: NodeId) -> &str {
        self.nodes.name(id)
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn props(&self, id: NodeId) -> Option<&NodeProps> {
        self.nodes.props(id)
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0 as usize]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0 as usize]
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn global(&self) -> &[Alternative] {
        &self.global
    }

    pub fn fallback(&self) -> NodeId {
        self.fallback
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn limits(&self) -> MatchLimits {
        self.limits
    }

    pub(crate) fn capture_fn(&self, index: usize) -> &CaptureFn {
        &self.capture_fns[index].1
    }

    /// Runs one match step at `pos`.
    ///
    /// Zero-length transitions are followed within the step up to the
    /// rematch limit. When nothing consumes input the default rule advances
    /// one character. Returns `None` only when `pos` is at the end of `text`.
    pub fn match_at(&self, state: &GrammarState, text: &str, pos: usize) -> Option<MatchResult> {
        let mut working = state.clone();
        let mut tokens = Vec::new();
        let mut transitions = 0;

        while let Some(matched) = self.step(&mut working, text, pos) {
            tokens.extend(matched.tokens());
            if matched.len > 0 {
                trace!(pos, len = matched.len, node = ?matched.node, "matched");
                return Some(MatchResult {
                    state: working,
                    length: matched.len,
                    tokens,
                });
            }
            transitions += 1;
            if transitions > self.limits.rematch_limit {
                warn!(pos, grammar = %self.name, "rematch limit reached, forcing default rule");
                break;
            }
        }

        let ch = text[pos..].chars().next()?;
        tokens.push(GrammarToken::new(Some(self.fallback), pos, pos + ch.len_utf8()));
        Some(MatchResult {
            state: working,
            length: ch.len_utf8(),
            tokens,
        })
    }

    /// One rule application: end rules, alternatives, then globals.
    fn step(&self, state: &mut GrammarState, text: &str, pos: usize) -> Option<Matched> {
        let Frame {
            node,
            state: current,
        } = state.top();

        for &rule in &self.state(current).end {
            if let Some(matched) = self.rule(rule).exec(self, state, text, pos) {
                state.pop();
                return Some(matched.wrap(Wrapping::End, node));
            }
        }

        let alternatives = &self.state(current).alternatives;
        self.try_alternatives(alternatives, state, text, pos)
            .or_else(|| self.try_alternatives(&self.global, state, text, pos))
    }

    fn try_alternatives(
        &self,
        alternatives: &[Alternative],
        state: &mut GrammarState,
        text: &str,
        pos: usize,
    ) -> Option<Matched> {
        for alternative in alternatives {
            match *alternative {
                Alternative::Rule(rule) => {
                    if let Some(matched) = self.rule(rule).exec(self, state, text, pos) {
                        return Some(matched);
                    }
                }
                Alternative::State(id) => {
                    if state.depth() >= self.limits.max_depth as usize {
                        continue;
                    }
                    let region = self.state(id);
                    let Some(begin) = region.begin else {
                        continue;
                    };
                    if let Some(matched) = self.rule(begin).exec(self, state, text, pos) {
                        state.push(Frame {
                            node: region.node,
                            state: id,
                        });
                        return Some(matched.wrap(Wrapping::Begin, region.node));
                    }
                }
            }
        }
        None
    }
}
