//! Per-parse mutable grammar state.

use std::collections::BTreeMap;
use std::sync::Arc;

use weft_core::{NodeId, Symbol};

use crate::grammar::StateId;

/// Grammar constants, shared by every state of one grammar.
pub type Variables = Arc<BTreeMap<Symbol, String>>;

/// Copy-on-write table of context variables.
///
/// Clones share storage until one of them is written to.
#[derive(Clone, Debug, Default)]
pub struct ContextTable {
    values: Arc<BTreeMap<Symbol, String>>,
}

impl ContextTable {
    pub fn new(values: BTreeMap<Symbol, String>) -> Self {
        Self {
            values: Arc::new(values),
        }
    }

    pub fn get(&self, name: Symbol) -> Option<&str> {
        self.values.get(&name).map(String::as_str)
    }

    pub fn set(&mut self, name: Symbol, value: String) {
        if self.get(name) == Some(value.as_str()) {
            return;
        }
        Arc::make_mut(&mut self.values).insert(name, value);
    }

    pub fn remove(&mut self, name: Symbol) {
        if self.values.contains_key(&name) {
            Arc::make_mut(&mut self.values).remove(&name);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for ContextTable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values) || self.values == other.values
    }
}

impl Eq for ContextTable {}

/// One pushed region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub node: Option<NodeId>,
    pub state: StateId,
}

/// Stack of active regions plus the context table.
///
/// The bottom frame is always the root state. Two states compare equal when
/// continuing from either one behaves identically: same frames, same context
/// contents, same grammar constants.
#[derive(Clone, Debug)]
pub struct GrammarState {
    variables: Variables,
    context: ContextTable,
    stack: Vec<Frame>,
}

impl GrammarState {
    pub(crate) fn new(variables: Variables, context: ContextTable) -> Self {
        Self {
            variables,
            context,
            stack: vec![Frame {
                node: None,
                state: StateId::ROOT,
            }],
        }
    }

    pub fn top(&self) -> Frame {
        // The root frame is never popped.
        self.stack[self.stack.len() - 1]
    }

    /// Number of pushed regions, the root excluded.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn frames(&self) -> &[Frame] {
        &self.stack
    }

    pub(crate) fn push(&mut self, frame: Frame) {
        self.stack.push(frame);
    }

    pub(crate) fn pop(&mut self) -> Option<Frame> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    pub fn context(&self) -> &ContextTable {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut ContextTable {
        &mut self.context
    }

    /// Context value, falling back to the grammar constant of the same name.
    pub fn lookup(&self, name: Symbol) -> Option<&str> {
        self.context
            .get(name)
            .or_else(|| self.variables.get(&name).map(String::as_str))
    }
}

impl PartialEq for GrammarState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.variables, &other.variables)
            && self.stack == other.stack
            && self.context == other.context
    }
}

impl Eq for GrammarState {}
