//! Grammar construction from a definition.
//!
//! Includes are flattened into alternative lists and memoized by entry name.
//! Region bodies are compiled after the entry that declares them, so a region
//! may include the list it belongs to. Only includes that reach themselves
//! without crossing a region are cycles.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;
use weft_core::{
    CaptureDef, ConditionTest, EntryDef, GrammarDef, GuardDef, Interner, ItemDef, NodeId,
    PatternDef, RegionDef, RuleDef, SetterDef, Symbol,
};

use crate::context::{Condition, Setter, Test};
use crate::error::{GrammarError, Result};
use crate::grammar::{Alternative, Grammar, MatchLimits, RuleId, State, StateId};
use crate::matcher::{DynamicRegex, Matcher, Piece, build_regex};
use crate::node::{NodeTable, Wrapping};
use crate::rule::{Capture, CaptureFn, CaptureVerdict, Guard, Rule};
use crate::state::{ContextTable, GrammarState};
use crate::template::Template;

const VAR_PREFIX: &str = "$var:";

/// Builder for [`Grammar`].
pub struct GrammarBuilder {
    def: GrammarDef,
    declared: Vec<String>,
    capture_fns: Vec<(String, CaptureFn)>,
    limits: MatchLimits,
}

impl GrammarBuilder {
    pub fn new(def: GrammarDef) -> Self {
        Self {
            def,
            declared: Vec::new(),
            capture_fns: Vec::new(),
            limits: MatchLimits::default(),
        }
    }

    /// Reserves a node id before the build, so capture functions can return it.
    pub fn node(&mut self, name: &str) -> NodeId {
        let index = match self.declared.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                self.declared.push(name.to_owned());
                self.declared.len() - 1
            }
        };
        NodeId::from_raw(NodeId::FIRST_USER + index as u32)
    }

    /// Registers a capture function referenced as `{ "function": name }`.
    pub fn capture_fn(
        mut self,
        name: &str,
        f: impl Fn(&str, &GrammarState) -> CaptureVerdict + Send + Sync + 'static,
    ) -> Self {
        self.capture_fns.push((name.to_owned(), Arc::new(f)));
        self
    }

    pub fn limits(mut self, limits: MatchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> Result<Grammar> {
        let def = &self.def;
        let mut nodes = NodeTable::new();
        for name in &self.declared {
            nodes.intern(name, Wrapping::Full);
        }

        let mut interner = Interner::new();
        let variables: BTreeMap<Symbol, String> = def
            .variables
            .iter()
            .map(|(name, value)| (interner.intern(name), value.clone()))
            .collect();
        let context: BTreeMap<Symbol, String> = def
            .context
            .iter()
            .map(|(name, value)| (interner.intern(name), value.clone()))
            .collect();

        let mut build = Build {
            def,
            capture_names: self.capture_fns.iter().map(|(n, _)| n.as_str()).collect(),
            context_names: context.keys().copied().collect(),
            variable_names: variables.keys().copied().collect(),
            interner,
            nodes,
            rules: Vec::new(),
            states: Vec::new(),
            cache: HashMap::new(),
            resolving: Vec::new(),
            pending: Vec::new(),
        };

        build.states.push(State {
            name: "root".to_owned(),
            node: None,
            begin: None,
            end: Vec::new(),
            alternatives: Vec::new(),
            embedded: None,
        });
        let root = build.items(&def.root, "root")?;
        if root.is_empty() {
            return Err(GrammarError::EmptyRules {
                path: "root".to_owned(),
            });
        }
        build.states[0].alternatives = root;
        let global = build.items(&def.global, "global")?;

        while let Some((id, patterns, path)) = build.pending.pop() {
            let alternatives = build.items(patterns, &path)?;
            build.states[id.0 as usize].alternatives = alternatives;
        }

        let fallback = match &def.fallback {
            Some(name) => build.node(name, Wrapping::Full, None),
            None => NodeId::ERROR,
        };
        for (name, node) in &def.nodes {
            let id = build.node(name, Wrapping::Full, None);
            if let Some(tag) = &node.autocomplete {
                build.nodes.set_autocomplete(id, tag.clone());
            }
        }

        debug!(
            grammar = %def.name,
            rules = build.rules.len(),
            states = build.states.len(),
            nodes = build.nodes.len(),
            "grammar built"
        );

        let Build {
            interner,
            nodes,
            rules,
            states,
            ..
        } = build;

        Ok(Grammar {
            name: self.def.name.clone(),
            rules,
            states,
            global,
            fallback,
            nodes,
            interner,
            variables: Arc::new(variables),
            initial_context: ContextTable::new(context),
            capture_fns: self.capture_fns,
            limits: self.limits,
        })
    }
}

impl Grammar {
    /// Loads and builds a JSON grammar without capture functions.
    pub fn from_json(json: &str) -> Result<Grammar> {
        GrammarBuilder::new(GrammarDef::from_json(json)?).build()
    }
}

struct Build<'d> {
    def: &'d GrammarDef,
    capture_names: Vec<&'d str>,
    context_names: HashSet<Symbol>,
    variable_names: HashSet<Symbol>,
    interner: Interner,
    nodes: NodeTable,
    rules: Vec<Rule>,
    states: Vec<State>,
    /// Flattened alternatives per repository entry.
    cache: HashMap<&'d str, Vec<Alternative>>,
    /// Entries being flattened, innermost last.
    resolving: Vec<&'d str>,
    /// Region bodies waiting to be compiled.
    pending: Vec<(StateId, &'d [ItemDef], String)>,
}

impl<'d> Build<'d> {
    fn node(&mut self, name: &str, wrapping: Wrapping, embedded: Option<&str>) -> NodeId {
        let fresh = self.nodes.id(name).is_none();
        let id = self.nodes.intern(name, wrapping);
        if fresh {
            let source = self.resolving.last().map(|s| (*s).to_owned());
            let props = self.nodes.props_mut(id);
            props.source = source;
            props.embedded = embedded.map(str::to_owned);
        }
        id
    }

    fn items(&mut self, items: &'d [ItemDef], path: &str) -> Result<Vec<Alternative>> {
        let mut alternatives = Vec::new();
        for (i, item) in items.iter().enumerate() {
            alternatives.extend(self.item(item, &format!("{path}[{i}]"))?);
        }
        Ok(alternatives)
    }

    fn item(&mut self, item: &'d ItemDef, path: &str) -> Result<Vec<Alternative>> {
        match item {
            ItemDef::Include(name) => self.include(name, path),
            ItemDef::Rule(rule) => Ok(vec![Alternative::Rule(self.rule(rule, path)?)]),
            ItemDef::Region(region) => Ok(vec![Alternative::State(self.region(region, path)?)]),
        }
    }

    fn include(&mut self, name: &'d str, path: &str) -> Result<Vec<Alternative>> {
        if let Some(alternatives) = self.cache.get(name) {
            return Ok(alternatives.clone());
        }
        if self.resolving.contains(&name) {
            return Err(GrammarError::IncludeCycle {
                path: path.to_owned(),
                name: name.to_owned(),
            });
        }
        let def: &'d GrammarDef = self.def;
        let Some(entry) = def.entry(name) else {
            return Err(GrammarError::UnknownInclude {
                path: path.to_owned(),
                name: name.to_owned(),
            });
        };

        let entry_path = format!("repository.{name}");
        self.resolving.push(name);
        let result = match entry {
            EntryDef::Item(item) => self.item(item, &entry_path),
            EntryDef::List(items) => self.items(items, &entry_path),
        };
        self.resolving.pop();

        let alternatives = result?;
        if alternatives.is_empty() {
            return Err(GrammarError::EmptyRules { path: entry_path });
        }
        self.cache.insert(name, alternatives.clone());
        Ok(alternatives)
    }

    fn region(&mut self, def: &'d RegionDef, path: &str) -> Result<StateId> {
        let id = StateId(self.states.len() as u32);
        let embedded = def.embedded.as_deref();
        let node = def
            .node
            .as_deref()
            .map(|name| self.node(name, Wrapping::Begin, embedded));
        self.states.push(State {
            name: path.to_owned(),
            node,
            begin: None,
            end: Vec::new(),
            alternatives: Vec::new(),
            embedded: def.embedded.clone(),
        });

        let begin_path = format!("{path}.begin");
        let begin = match self.item(&def.begin, &begin_path)?.as_slice() {
            [Alternative::Rule(rule)] => *rule,
            alternatives if alternatives.iter().any(|a| matches!(a, Alternative::State(_))) => {
                return Err(GrammarError::ExpectedRule {
                    path: begin_path,
                    role: "`begin`",
                });
            }
            _ => return Err(GrammarError::AmbiguousBegin { path: begin_path }),
        };

        let end_path = format!("{path}.end");
        let mut end = Vec::new();
        for alternative in self.items(&def.end, &end_path)? {
            match alternative {
                Alternative::Rule(rule) => end.push(rule),
                Alternative::State(_) => {
                    return Err(GrammarError::ExpectedRule {
                        path: end_path,
                        role: "`end`",
                    });
                }
            }
        }

        let state = &mut self.states[id.0 as usize];
        state.begin = Some(begin);
        state.end = end;
        self.pending
            .push((id, def.patterns.as_slice(), format!("{path}.patterns")));
        Ok(id)
    }

    fn rule(&mut self, def: &'d RuleDef, path: &str) -> Result<RuleId> {
        let node = def
            .node
            .as_deref()
            .map(|name| self.node(name, Wrapping::Full, None));
        let matcher = self.matcher(&def.pattern, path)?;

        if !def.captures.is_empty() && !matches!(def.pattern, PatternDef::Regex(_)) {
            return Err(GrammarError::CapturesWithoutRegex {
                path: path.to_owned(),
            });
        }
        let groups = matcher.group_count();
        let mut captures = Vec::with_capacity(def.captures.len());
        for (index, capture) in &def.captures {
            if *index as usize >= groups {
                return Err(GrammarError::CaptureIndex {
                    path: format!("{path}.captures"),
                    index: *index,
                    groups: groups - 1,
                });
            }
            let capture = match capture {
                CaptureDef::Node(name) => Capture::Node(self.node(name, Wrapping::Full, None)),
                CaptureDef::Function(name) => {
                    let Some(f) = self.capture_names.iter().position(|n| *n == name.as_str()) else {
                        return Err(GrammarError::UnknownCaptureFunction {
                            path: format!("{path}.captures"),
                            name: name.clone(),
                        });
                    };
                    Capture::Function(f)
                }
            };
            captures.push((*index as usize, capture));
        }

        let lookbehind = def
            .lookbehind
            .as_ref()
            .map(|guard| self.guard(guard, true, &format!("{path}.lookbehind")))
            .transpose()?;
        let lookahead = def
            .lookahead
            .as_ref()
            .map(|guard| self.guard(guard, false, &format!("{path}.lookahead")))
            .transpose()?;

        let setters = def
            .context
            .iter()
            .enumerate()
            .map(|(i, setter)| self.setter(setter, &format!("{path}.context[{i}]")))
            .collect::<Result<Vec<_>>>()?;

        let id = RuleId(self.rules.len() as u32);
        self.rules.push(Rule {
            path: path.to_owned(),
            node,
            matcher,
            lookbehind,
            lookahead,
            captures,
            setters,
            rematch: def.rematch,
        });
        Ok(id)
    }

    fn matcher(&self, pattern: &PatternDef, path: &str) -> Result<Matcher> {
        let ignore_case = self.def.ignore_case;
        match pattern {
            PatternDef::Regex(source) => self.regex(self.interpolate(source, path)?, path),
            PatternDef::Literal(literal) => {
                let pieces = self.interpolate(literal, path)?;
                if let [Piece::Text(text)] = pieces.as_slice()
                    && !ignore_case
                {
                    return Ok(Matcher::Literal(text.clone()));
                }
                let escaped = pieces
                    .into_iter()
                    .map(|piece| match piece {
                        Piece::Text(text) => Piece::Text(regex_syntax::escape(&text)),
                        piece => piece,
                    })
                    .collect();
                self.regex(escaped, path)
            }
            PatternDef::Lookup(words) => {
                let mut resolved = Vec::with_capacity(words.len());
                for word in words {
                    match self.interpolate(word, path)?.as_slice() {
                        [] => {}
                        [Piece::Text(text)] => resolved.push(text.clone()),
                        _ => {
                            return Err(GrammarError::Regex {
                                path: path.to_owned(),
                                message: "lookup words cannot reference context variables"
                                    .to_owned(),
                            });
                        }
                    }
                }
                if resolved.is_empty() {
                    return Err(GrammarError::EmptyRules {
                        path: path.to_owned(),
                    });
                }

                let mut sorted = resolved.clone();
                sorted.sort_by_key(|word| std::cmp::Reverse(word.len()));
                let alternation = sorted
                    .iter()
                    .map(|word| regex_syntax::escape(word))
                    .collect::<Vec<_>>()
                    .join("|");
                let regex = build_regex(&format!("(?:{alternation})"), ignore_case)
                    .map_err(|e| regex_error(path, e))?;
                Ok(Matcher::Lookup {
                    words: resolved,
                    regex,
                })
            }
        }
    }

    /// Regex matcher, dynamic when the pieces reference context variables.
    fn regex(&self, pieces: Vec<Piece>, path: &str) -> Result<Matcher> {
        let ignore_case = self.def.ignore_case;
        match pieces.as_slice() {
            [] => Err(GrammarError::Regex {
                path: path.to_owned(),
                message: "empty pattern".to_owned(),
            }),
            [Piece::Text(source)] => {
                let regex = build_regex(source, ignore_case).map_err(|e| regex_error(path, e))?;
                Ok(Matcher::Regex {
                    source: source.clone(),
                    regex,
                })
            }
            _ => DynamicRegex::new(pieces, ignore_case)
                .map(Matcher::Dynamic)
                .map_err(|e| regex_error(path, e)),
        }
    }

    fn guard(&self, guard: &GuardDef, behind: bool, path: &str) -> Result<Guard> {
        let mut pieces = self.interpolate(&guard.pattern, path)?;
        if behind {
            pieces.insert(0, Piece::Text("(?:".to_owned()));
            pieces.push(Piece::Text(")$".to_owned()));
            pieces = merge_text(pieces);
        }
        Ok(Guard {
            matcher: self.regex(pieces, path)?,
            negate: guard.negate,
        })
    }

    /// Splits `source` on `$var:name` references. Grammar constants are
    /// substituted as text, context variables stay as pieces.
    fn interpolate(&self, source: &str, path: &str) -> Result<Vec<Piece>> {
        let mut pieces = Vec::new();
        let mut rest = source;

        while let Some(at) = rest.find(VAR_PREFIX) {
            pieces.push(Piece::Text(rest[..at].to_owned()));
            let after = &rest[at + VAR_PREFIX.len()..];
            let len = after
                .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
                .unwrap_or(after.len());
            let name = &after[..len];

            let symbol = self.interner.get(name);
            match symbol {
                Some(symbol) if self.context_names.contains(&symbol) => {
                    pieces.push(Piece::Context {
                        symbol,
                        name: name.to_owned(),
                    });
                }
                _ => {
                    let Some(value) = self.constant(name) else {
                        return Err(GrammarError::UnknownVariable {
                            path: path.to_owned(),
                            name: format!("{VAR_PREFIX}{name}"),
                        });
                    };
                    pieces.push(Piece::Text(value.to_owned()));
                }
            }
            rest = &after[len..];
        }
        pieces.push(Piece::Text(rest.to_owned()));

        Ok(merge_text(pieces))
    }

    fn constant(&self, name: &str) -> Option<&'d str> {
        self.def
            .variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    fn setter(&self, def: &SetterDef, path: &str) -> Result<Setter> {
        let name = self
            .interner
            .get(&def.name)
            .filter(|symbol| self.context_names.contains(symbol))
            .ok_or_else(|| GrammarError::UndeclaredContext {
                path: path.to_owned(),
                name: def.name.clone(),
            })?;

        let value = def
            .value
            .as_deref()
            .map(|source| self.template(source, path))
            .transpose()?;

        let condition = match &def.condition {
            Some(condition) => {
                let subject = condition
                    .subject
                    .as_deref()
                    .map(|source| self.template(source, path))
                    .transpose()?;
                let test = match &condition.test {
                    ConditionTest::NonEmpty => Test::NonEmpty,
                    ConditionTest::Equals(value) => Test::Equals(value.clone()),
                    ConditionTest::Matches(source) => Test::Matches(
                        build_regex(source, false).map_err(|e| regex_error(path, e))?,
                    ),
                };
                Some(Condition { subject, test })
            }
            None => None,
        };

        Ok(Setter {
            name,
            value,
            condition,
            immediate: def.immediate,
        })
    }

    fn template(&self, source: &str, path: &str) -> Result<Template> {
        Template::parse(source, |name| {
            self.interner.get(name).filter(|symbol| {
                self.context_names.contains(symbol) || self.variable_names.contains(symbol)
            })
        })
        .map_err(|name| GrammarError::UnknownVariable {
            path: path.to_owned(),
            name: format!("${name}"),
        })
    }
}

fn merge_text(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Text(text) if text.is_empty() => {}
            Piece::Text(text) => match merged.last_mut() {
                Some(Piece::Text(last)) => last.push_str(&text),
                _ => merged.push(Piece::Text(text)),
            },
            piece => merged.push(piece),
        }
    }
    merged
}

fn regex_error(path: &str, error: impl std::fmt::Display) -> GrammarError {
    GrammarError::Regex {
        path: path.to_owned(),
        message: error.to_string(),
    }
}
