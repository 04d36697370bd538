#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the Weft crates.
//!
//! - **Node ids**: `NodeId` plus the reserved ids every grammar carries
//! - **Interner**: cheap `Symbol` handles for context variable names
//! - **Grammar definitions**: the authoring format (JSON / binary) before it
//!   is compiled into a matching engine
//! - **Node buffers**: the flat postfix records handed to a tree sink

use serde::{Deserialize, Serialize};

pub mod buffer;
pub mod grammar;
mod interner;


pub use buffer::{NodeBuffer, NodeRecord, RecordKind, Subtree};
pub use grammar::{
    CaptureDef, ConditionDef, ConditionTest, EntryDef, GrammarDef, GrammarDefError, GuardDef,
    ItemDef, NodeDef, PatternDef, RegionDef, RuleDef, SetterDef,
};
pub use interner::{Interner, Symbol};

/// Identity of a node type.
///
/// Ids are dense: a grammar's node table is indexed by them. The first
/// [`NodeId::FIRST_USER`] ids are reserved for nodes the engine itself emits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Single-character advance when no rule matched.
    pub const ERROR: NodeId = NodeId(0);
    /// Zero-length marker preceding a region closed at the end of the input.
    pub const INCOMPLETE: NodeId = NodeId(1);
    /// Root node wrapping a whole parse.
    pub const DOCUMENT: NodeId = NodeId(2);

    /// First id handed out to grammar-declared nodes.
    pub const FIRST_USER: u32 = 3;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this id belongs to the engine rather than a grammar.
    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    /// Display name of a reserved id.
    pub fn reserved_name(self) -> Option<&'static str> {
        match self {
            Self::ERROR => Some("⚠"),
            Self::INCOMPLETE => Some("Incomplete"),
            Self::DOCUMENT => Some("Document"),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
