use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use weft_engine::{Edit, ParseConfig, ParseStats, Parser, SyntaxTree, TreeBuilder, TreeFragment};
use weft_grammar::Grammar;

use super::grammar_loader::{load_grammar, load_source};
use super::{CliError, fail};

pub struct ReparseArgs {
    pub grammar_path: PathBuf,
    pub source_path: PathBuf,
    pub from: usize,
    pub to: usize,
    pub insert: String,
    pub config: ParseConfig,
}

/// Outcome of an incremental reparse next to a from-scratch one.
#[derive(Debug)]
pub struct ReparseReport {
    pub text: String,
    pub tree: SyntaxTree,
    pub stats: ParseStats,
    pub fresh_stats: ParseStats,
    /// Whether the incremental tree equals the from-scratch tree.
    pub identical: bool,
}

pub fn run(args: ReparseArgs) {
    let grammar = load_grammar(&args.grammar_path).unwrap_or_else(|err| fail(err));
    let source = load_source(Some(&args.source_path), None).unwrap_or_else(|err| fail(err));

    let report = reparse(
        &grammar,
        &source,
        args.from..args.to,
        &args.insert,
        args.config,
    )
    .unwrap_or_else(|err| fail(err));

    print!("{}", report.tree.dump(&grammar));
    println!();
    println!("document: {} bytes", report.text.len());
    println!(
        "matches: {} (from scratch: {})",
        report.stats.matches, report.fresh_stats.matches
    );
    println!(
        "reused chunks: {} before edit, {} after",
        report.stats.reused_left, report.stats.reused_right
    );
    println!(
        "matches from-scratch tree: {}",
        if report.identical { "yes" } else { "no" }
    );
}

/// Replaces `range` of `old` with `insert` and returns the new text with the
/// matching [`Edit`].
pub fn apply_edit(
    old: &str,
    range: std::ops::Range<usize>,
    insert: &str,
) -> Result<(String, Edit), CliError> {
    if range.start > range.end || range.end > old.len() {
        return Err(CliError::Edit(format!(
            "range {}..{} is outside the document (length {})",
            range.start,
            range.end,
            old.len()
        )));
    }
    if !old.is_char_boundary(range.start) || !old.is_char_boundary(range.end) {
        return Err(CliError::Edit(format!(
            "range {}..{} splits a character",
            range.start, range.end
        )));
    }

    let mut text = String::with_capacity(old.len() + insert.len());
    text.push_str(&old[..range.start]);
    text.push_str(insert);
    text.push_str(&old[range.end..]);
    Ok((text, Edit::replace(range.start, range.end, insert.len())))
}

/// Parses `old`, applies the edit, reparses reusing the first tree, and
/// checks the result against a parse from scratch.
pub fn reparse(
    grammar: &Grammar,
    old: &str,
    range: std::ops::Range<usize>,
    insert: &str,
    config: ParseConfig,
) -> Result<ReparseReport, CliError> {
    let (text, edit) = apply_edit(old, range, insert)?;

    let previous = Parser::new(grammar, old, TreeBuilder).config(config).parse();
    let fragment = TreeFragment::new(Arc::new(previous.tree), 0, old.len());
    let parsed = Parser::new(grammar, text.as_str(), TreeBuilder)
        .config(config)
        .reuse(vec![fragment], Some(edit))
        .parse();
    let fresh = Parser::new(grammar, text.as_str(), TreeBuilder)
        .config(config)
        .parse();

    info!(
        matches = parsed.stats.matches,
        fresh = fresh.stats.matches,
        "reparsed"
    );
    Ok(ReparseReport {
        identical: parsed.tree == fresh.tree,
        text,
        tree: parsed.tree,
        stats: parsed.stats,
        fresh_stats: fresh.stats,
    })
}
