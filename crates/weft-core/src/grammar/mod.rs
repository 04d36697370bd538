//! Grammar definitions as authored.
//!
//! This module provides the types for grammar files, with support for JSON
//! deserialization and compact binary serialization.

mod binary;
mod json;
mod types;

#[cfg(test)]
mod json_tests;

pub use json::GrammarDefError;
pub use types::{
    CaptureDef, ConditionDef, ConditionTest, EntryDef, GrammarDef, GuardDef, ItemDef, NodeDef,
    PatternDef, RegionDef, RuleDef, SetterDef,
};
