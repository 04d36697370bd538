//! Incremental parsing on top of a Weft grammar.
//!
//! The [`Parser`] drives [`Grammar::match_at`](weft_grammar::Grammar::match_at)
//! over a document, caching the resulting tokens in a [`ChunkBuffer`]. A later
//! parse of an edited document reuses cached chunks on both sides of the edit.
//! The [`Compiler`] turns the buffer into a flat [`NodeBuffer`](weft_core::NodeBuffer)
//! that a [`TreeSink`] builds a tree from.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod chunk;
mod chunk_buffer;
mod compiler;
mod config;
mod input;
mod parser;
mod tree;

#[cfg(test)]
mod compiler_tests;
#[cfg(test)]
mod parser_tests;
#[cfg(test)]
pub mod test_utils;

pub use chunk::{Chunk, ChunkToken};
pub use chunk_buffer::{Bias, ChunkBuffer};
pub use compiler::{CompileStack, Compiler};
pub use config::ParseConfig;
pub use input::{Input, Region, Window};
pub use parser::{Edit, ParseStats, Parsed, Parser, TreeFragment};
pub use tree::{ChunkSource, SyntaxNode, SyntaxTree, TreeBuilder, TreeSink};
