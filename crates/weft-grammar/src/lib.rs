//! Weft grammar engine: builds a definition into an immutable rule/state
//! graph and runs one match step at a time against a [`GrammarState`].
//!
//! - `build` - definition to [`Grammar`], include flattening and validation
//! - `grammar` - arenas and the one-step match entrypoint
//! - `rule` / `matcher` - rule application and pattern matching
//! - `state` / `context` / `template` - per-parse state and context variables
//! - `matched` - match results and their token form

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod build;
mod context;
mod dump;
mod error;
mod grammar;
mod matched;
mod matcher;
mod node;
mod rule;
mod state;
mod template;

#[cfg(test)]
mod matched_tests;
#[cfg(test)]
mod template_tests;
#[cfg(test)]
pub mod test_utils;

pub use build::GrammarBuilder;
pub use context::{Condition, Setter, Test};
pub use error::{GrammarError, Result};
pub use grammar::{Alternative, Grammar, MatchLimits, MatchResult, RuleId, State, StateId};
pub use matched::{GrammarToken, Matched};
pub use matcher::{DynamicRegex, MatchOutput, Matcher, Piece};
pub use node::{Node, NodeProps, NodeTable, Wrapping};
pub use rule::{Capture, CaptureFn, CaptureVerdict, Guard, Rule};
pub use state::{ContextTable, Frame, GrammarState, Variables};
pub use template::Template;
