//! Pattern matchers.
//!
//! Every matcher runs anchored at a position inside a window of text. The
//! whole window is the haystack, so assertions such as `\b` see the text
//! before the position.

use std::ops::Range;
use std::sync::{Arc, Mutex};

use regex_automata::meta::{BuildError, Regex};
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};
use weft_core::Symbol;

use crate::state::ContextTable;

/// Compiled dynamic regexes kept per matcher.
const DYNAMIC_CACHE_SIZE: usize = 8;

/// Result of a successful match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOutput<'t> {
    pub total: &'t str,
    /// Group spans relative to the match start, indexed by group (0 is the
    /// whole match). `None` for matchers without groups.
    pub captures: Option<Vec<Option<Range<usize>>>>,
}

impl MatchOutput<'_> {
    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// Text of every group, `groups[0]` being the whole match.
    pub fn groups(&self) -> Vec<Option<&str>> {
        match &self.captures {
            Some(spans) => spans
                .iter()
                .map(|span| span.clone().map(|span| &self.total[span]))
                .collect(),
            None => vec![Some(self.total)],
        }
    }
}

#[derive(Debug)]
pub enum Matcher {
    /// Case-sensitive literal.
    Literal(String),
    /// Literal list compiled to an alternation, longest word first.
    Lookup { words: Vec<String>, regex: Regex },
    Regex { source: String, regex: Regex },
    /// Regex with context variables substituted at match time.
    Dynamic(DynamicRegex),
}

impl Matcher {
    pub fn test(&self, text: &str, pos: usize, context: &ContextTable) -> bool {
        self.exec(text, pos, context).is_some()
    }

    pub fn exec<'t>(
        &self,
        text: &'t str,
        pos: usize,
        context: &ContextTable,
    ) -> Option<MatchOutput<'t>> {
        match self {
            Self::Literal(literal) => text[pos..]
                .starts_with(literal.as_str())
                .then(|| MatchOutput {
                    total: &text[pos..pos + literal.len()],
                    captures: None,
                }),
            Self::Lookup { regex, .. } => {
                let m = regex.search(&anchored(text, pos))?;
                Some(MatchOutput {
                    total: &text[m.range()],
                    captures: None,
                })
            }
            Self::Regex { regex, .. } => exec_captures(regex, text, pos),
            Self::Dynamic(dynamic) => {
                let regex = dynamic.resolve(context)?;
                exec_captures(&regex, text, pos)
            }
        }
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn find(&self, text: &str, context: &ContextTable) -> bool {
        match self {
            Self::Literal(literal) => text.contains(literal.as_str()),
            Self::Lookup { regex, .. } | Self::Regex { regex, .. } => regex.is_match(text),
            Self::Dynamic(dynamic) => dynamic
                .resolve(context)
                .is_some_and(|regex| regex.is_match(text)),
        }
    }

    /// Number of groups including the implicit whole-match group.
    pub fn group_count(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Lookup { .. } => 1,
            Self::Regex { regex, .. } => regex.captures_len(),
            Self::Dynamic(dynamic) => dynamic.groups,
        }
    }

    pub fn source(&self) -> String {
        match self {
            Self::Literal(literal) => format!("{literal:?}"),
            Self::Lookup { words, .. } => format!("[{}]", words.join(", ")),
            Self::Regex { source, .. } => format!("/{source}/"),
            Self::Dynamic(dynamic) => format!("/{}/", dynamic.display()),
        }
    }
}

fn anchored(text: &str, pos: usize) -> Input<'_> {
    Input::new(text)
        .span(pos..text.len())
        .anchored(Anchored::Yes)
}

fn exec_captures<'t>(regex: &Regex, text: &'t str, pos: usize) -> Option<MatchOutput<'t>> {
    let mut caps = regex.create_captures();
    regex.search_captures(&anchored(text, pos), &mut caps);
    let m = caps.get_match()?;
    let captures = (0..caps.group_len())
        .map(|group| {
            caps.get_group(group)
                .map(|span| span.start - m.start()..span.end - m.start())
        })
        .collect();

    Some(MatchOutput {
        total: &text[m.range()],
        captures: Some(captures),
    })
}

pub(crate) fn build_regex(pattern: &str, ignore_case: bool) -> Result<Regex, BuildError> {
    Regex::builder()
        .syntax(syntax::Config::new().case_insensitive(ignore_case))
        .build(pattern)
}

/// Piece of a dynamic pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Piece {
    /// Regex source, inserted verbatim.
    Text(String),
    /// Context variable, escaped on substitution.
    Context { symbol: Symbol, name: String },
}

#[derive(Debug)]
pub struct DynamicRegex {
    pieces: Vec<Piece>,
    ignore_case: bool,
    groups: usize,
    cache: Mutex<Vec<(String, Arc<Regex>)>>,
}

impl DynamicRegex {
    /// Checks the template by compiling it with empty substitutions.
    pub(crate) fn new(pieces: Vec<Piece>, ignore_case: bool) -> Result<Self, BuildError> {
        let probe = build_regex(&Self::render(&pieces, |_| ""), ignore_case)?;
        Ok(Self {
            pieces,
            ignore_case,
            groups: probe.captures_len(),
            cache: Mutex::new(Vec::with_capacity(DYNAMIC_CACHE_SIZE)),
        })
    }

    fn render<'a>(pieces: &'a [Piece], value: impl Fn(Symbol) -> &'a str) -> String {
        let mut source = String::new();
        for piece in pieces {
            match piece {
                Piece::Text(text) => source.push_str(text),
                Piece::Context { symbol, .. } => {
                    source.push_str(&regex_syntax::escape(value(*symbol)))
                }
            }
        }
        source
    }

    fn display(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Context { name, .. } => {
                    out.push_str("$var:");
                    out.push_str(name);
                }
            }
        }
        out
    }

    /// Compiled regex for the current context, `None` if the substituted
    /// pattern does not compile.
    fn resolve(&self, context: &ContextTable) -> Option<Arc<Regex>> {
        let source = Self::render(&self.pieces, |symbol| {
            context.get(symbol).unwrap_or_default()
        });

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, regex)) = cache.iter().find(|(s, _)| *s == source) {
            return Some(regex.clone());
        }

        let regex = Arc::new(build_regex(&source, self.ignore_case).ok()?);
        if cache.len() == DYNAMIC_CACHE_SIZE {
            cache.remove(0);
        }
        cache.push((source, regex.clone()));
        Some(regex)
    }
}
