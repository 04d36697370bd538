//! Grammar definition types.
//!
//! These mirror the authoring format one to one. Nothing here is validated
//! beyond shape; the grammar builder resolves includes, compiles patterns and
//! reports authoring errors.

use serde::{Deserialize, Serialize};

/// A complete grammar definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarDef {
    /// Grammar name (e.g., "ini", "markdown").
    pub name: String,
    /// Literal and regex matchers ignore case.
    pub ignore_case: bool,
    /// Build-time constants substituted into `$var:name` references.
    pub variables: Vec<(String, String)>,
    /// Context variables with their initial values.
    pub context: Vec<(String, String)>,
    /// Node assigned to the single-character default advance.
    pub fallback: Option<String>,
    /// Alternatives of the root state.
    pub root: Vec<ItemDef>,
    /// Alternatives tried in every state after its own.
    pub global: Vec<ItemDef>,
    /// Named entries reachable through `#name` includes, in definition order.
    pub repository: Vec<(String, EntryDef)>,
    /// Per-node properties.
    pub nodes: Vec<(String, NodeDef)>,
}

/// A repository entry: a single item or a list flattened on include.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryDef {
    Item(ItemDef),
    List(Vec<ItemDef>),
}

/// One alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemDef {
    /// `#name` reference into the repository (stored without the `#`).
    Include(String),
    Rule(RuleDef),
    Region(RegionDef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub node: Option<String>,
    pub pattern: PatternDef,
    pub captures: Vec<(u32, CaptureDef)>,
    pub lookbehind: Option<GuardDef>,
    pub lookahead: Option<GuardDef>,
    pub context: Vec<SetterDef>,
    /// Consume nothing; only apply transitions.
    pub rematch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternDef {
    Regex(String),
    Literal(String),
    Lookup(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaptureDef {
    Node(String),
    /// Capture function registered on the grammar builder.
    Function(String),
}

/// Zero-width guard around a rule's match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardDef {
    pub pattern: String,
    pub negate: bool,
}

impl GuardDef {
    /// Parses the `!pattern` shorthand for a negated guard.
    pub fn parse(source: &str) -> Self {
        match source.strip_prefix('!') {
            Some(pattern) => Self {
                pattern: pattern.to_owned(),
                negate: true,
            },
            None => Self {
                pattern: source.to_owned(),
                negate: false,
            },
        }
    }
}

/// Context variable mutation attached to a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetterDef {
    pub name: String,
    /// Template for the new value; `None` removes the variable.
    pub value: Option<String>,
    pub condition: Option<ConditionDef>,
    /// Run before the pattern is tried instead of after a successful match.
    pub immediate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDef {
    /// Template for the tested text; the match text when absent.
    pub subject: Option<String>,
    pub test: ConditionTest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionTest {
    NonEmpty,
    Equals(String),
    Matches(String),
}

/// Nested begin/end construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDef {
    pub node: Option<String>,
    pub begin: Box<ItemDef>,
    pub end: Vec<ItemDef>,
    pub patterns: Vec<ItemDef>,
    /// Marker for an embedded language handled by the host.
    pub embedded: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub autocomplete: Option<String>,
}

impl GrammarDef {
    pub fn entry(&self, name: &str) -> Option<&EntryDef> {
        self.repository
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
    }

    pub fn node(&self, name: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|(n, _)| n == name).map(|(_, def)| def)
    }
}
