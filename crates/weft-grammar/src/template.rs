//! Value templates used by context setters.
//!
//! `$name` expands a context variable (falling back to the grammar constant of
//! the same name), `$0`..`$9` expand the match and its groups, `$$` is a
//! literal dollar. A `$` followed by anything else is kept as is.

use weft_core::Symbol;

use crate::state::GrammarState;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var(Symbol),
    Group(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `source`, resolving variable names with `resolve`.
    ///
    /// Returns the first unresolved name on failure.
    pub fn parse(source: &str, resolve: impl Fn(&str) -> Option<Symbol>) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(at) = rest.find('$') {
            text.push_str(&rest[..at]);
            let after = &rest[at + 1..];
            let next = after.chars().next();

            match next {
                Some('$') => {
                    text.push('$');
                    rest = &after[1..];
                }
                Some(d) if d.is_ascii_digit() => {
                    flush(&mut segments, &mut text);
                    segments.push(Segment::Group(d as usize - '0' as usize));
                    rest = &after[1..];
                }
                Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                    let len = after
                        .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
                        .unwrap_or(after.len());
                    let name = &after[..len];
                    let symbol = resolve(name).ok_or_else(|| name.to_owned())?;
                    flush(&mut segments, &mut text);
                    segments.push(Segment::Var(symbol));
                    rest = &after[len..];
                }
                _ => {
                    text.push('$');
                    rest = after;
                }
            }
        }
        text.push_str(rest);
        flush(&mut segments, &mut text);

        Ok(Self { segments })
    }

    /// Expands against the current state and match groups (`groups[0]` is the
    /// whole match). Missing values expand to nothing.
    pub fn expand(&self, state: &GrammarState, groups: &[Option<&str>]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(symbol) => out.push_str(state.lookup(*symbol).unwrap_or_default()),
                Segment::Group(index) => {
                    out.push_str(groups.get(*index).copied().flatten().unwrap_or_default())
                }
            }
        }
        out
    }
}

fn flush(segments: &mut Vec<Segment>, text: &mut String) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}
