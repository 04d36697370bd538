//! JSON deserialization for grammar files.
//!
//! Items are either `"#name"` include strings or objects. An object with a
//! `begin` key is a region, anything else is a rule. Shape errors carry a
//! dotted path to the offending item.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::de::{self, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::types::{
    CaptureDef, ConditionDef, ConditionTest, EntryDef, GrammarDef, GuardDef, ItemDef, NodeDef,
    PatternDef, RegionDef, RuleDef, SetterDef,
};

/// Error while loading a grammar definition.
#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary codec error: {0}")]
    Binary(#[from] postcard::Error),
    #[error("{path}: {message}")]
    Shape { path: String, message: String },
}

fn shape(path: &str, message: impl Into<String>) -> GrammarDefError {
    GrammarDefError::Shape {
        path: path.to_owned(),
        message: message.into(),
    }
}

impl GrammarDef {
    /// Parse a grammar definition from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GrammarDefError> {
        let raw: RawGrammar = serde_json::from_str(json)?;
        raw.try_into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawGrammar {
    name: String,
    #[serde(default)]
    ignore_case: bool,
    #[serde(default)]
    variables: IndexMap<String, String>,
    #[serde(default)]
    context: IndexMap<String, String>,
    #[serde(default)]
    fallback: Option<String>,
    root: Vec<RawItem>,
    #[serde(default)]
    global: Vec<RawItem>,
    #[serde(default)]
    repository: IndexMap<String, OneOrMany<RawItem>>,
    #[serde(default)]
    nodes: IndexMap<String, RawNode>,
}

impl TryFrom<RawGrammar> for GrammarDef {
    type Error = GrammarDefError;

    fn try_from(raw: RawGrammar) -> Result<Self, Self::Error> {
        let root = convert_items(raw.root, "root")?;
        let global = convert_items(raw.global, "global")?;

        let mut repository = Vec::with_capacity(raw.repository.len());
        for (name, entry) in raw.repository {
            let path = format!("repository.{name}");
            let entry = match entry {
                OneOrMany::One(item) => EntryDef::Item(convert_item(item, &path)?),
                OneOrMany::Many(items) => EntryDef::List(convert_items(items, &path)?),
            };
            repository.push((name, entry));
        }

        // IndexMap preserves definition order, which is the order alternatives are tried in.
        Ok(Self {
            name: raw.name,
            ignore_case: raw.ignore_case,
            variables: raw.variables.into_iter().collect(),
            context: raw.context.into_iter().collect(),
            fallback: raw.fallback,
            root,
            global,
            repository,
            nodes: raw
                .nodes
                .into_iter()
                .map(|(name, node)| {
                    (
                        name,
                        NodeDef {
                            autocomplete: node.autocomplete,
                        },
                    )
                })
                .collect(),
        })
    }
}

#[derive(Debug)]
enum RawItem {
    Include(String),
    Pattern(Box<RawPattern>),
}

impl<'de> Deserialize<'de> for RawItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ItemVisitor;

        impl<'de> Visitor<'de> for ItemVisitor {
            type Value = RawItem;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a `#name` include or a rule/region object")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RawItem, E> {
                Ok(RawItem::Include(v.to_owned()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<RawItem, A::Error> {
                let pattern = RawPattern::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(RawItem::Pattern(Box::new(pattern)))
            }
        }

        deserializer.deserialize_any(ItemVisitor)
    }
}

/// A single value or a list of values.
#[derive(Debug)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OneOrManyVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for OneOrManyVisitor<T> {
            type Value = OneOrMany<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an item or a list of items")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                T::deserialize(v.into_deserializer()).map(OneOrMany::One)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                T::deserialize(de::value::MapAccessDeserializer::new(map)).map(OneOrMany::One)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
                Vec::<T>::deserialize(de::value::SeqAccessDeserializer::new(seq))
                    .map(OneOrMany::Many)
            }
        }

        deserializer.deserialize_any(OneOrManyVisitor(PhantomData))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPattern {
    #[serde(rename = "match")]
    regex: Option<String>,
    literal: Option<String>,
    lookup: Option<Vec<String>>,
    node: Option<String>,
    captures: IndexMap<String, RawCapture>,
    lookbehind: Option<String>,
    lookahead: Option<String>,
    context: Vec<RawSetter>,
    rematch: bool,
    begin: Option<RawItem>,
    end: Option<OneOrMany<RawItem>>,
    patterns: Vec<RawItem>,
    embedded: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCapture {
    Node(String),
    Function { function: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSetter {
    set: String,
    #[serde(default)]
    to: Option<String>,
    #[serde(default, rename = "if")]
    subject: Option<String>,
    #[serde(default)]
    equals: Option<String>,
    #[serde(default)]
    matches: Option<String>,
    #[serde(default)]
    immediate: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawNode {
    autocomplete: Option<String>,
}

fn convert_items(items: Vec<RawItem>, path: &str) -> Result<Vec<ItemDef>, GrammarDefError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| convert_item(item, &format!("{path}[{i}]")))
        .collect()
}

fn convert_item(item: RawItem, path: &str) -> Result<ItemDef, GrammarDefError> {
    match item {
        RawItem::Include(reference) => match reference.strip_prefix('#') {
            Some(name) if !name.is_empty() => Ok(ItemDef::Include(name.to_owned())),
            _ => Err(shape(
                path,
                format!("expected a `#name` include, found `{reference}`"),
            )),
        },
        RawItem::Pattern(pattern) if pattern.begin.is_some() => {
            convert_region(*pattern, path).map(ItemDef::Region)
        }
        RawItem::Pattern(pattern) => convert_rule(*pattern, path).map(ItemDef::Rule),
    }
}

fn convert_region(raw: RawPattern, path: &str) -> Result<RegionDef, GrammarDefError> {
    let stray = [
        ("match", raw.regex.is_some()),
        ("literal", raw.literal.is_some()),
        ("lookup", raw.lookup.is_some()),
        ("captures", !raw.captures.is_empty()),
        ("lookbehind", raw.lookbehind.is_some()),
        ("lookahead", raw.lookahead.is_some()),
        ("context", !raw.context.is_empty()),
        ("rematch", raw.rematch),
    ];
    if let Some((key, _)) = stray.iter().find(|(_, present)| *present) {
        return Err(shape(
            path,
            format!("`{key}` is not allowed on a region; move it to `begin`"),
        ));
    }

    let Some(begin) = raw.begin else {
        return Err(shape(path, "region needs `begin`"));
    };
    let begin = convert_item(begin, &format!("{path}.begin"))?;

    let end = raw.end.map(OneOrMany::into_vec).unwrap_or_default();
    if end.is_empty() {
        return Err(shape(path, "region needs at least one `end` item"));
    }
    let end = convert_items(end, &format!("{path}.end"))?;

    Ok(RegionDef {
        node: raw.node,
        begin: Box::new(begin),
        end,
        patterns: convert_items(raw.patterns, &format!("{path}.patterns"))?,
        embedded: raw.embedded,
    })
}

fn convert_rule(raw: RawPattern, path: &str) -> Result<RuleDef, GrammarDefError> {
    if raw.end.is_some() || !raw.patterns.is_empty() || raw.embedded.is_some() {
        return Err(shape(
            path,
            "`end`, `patterns` and `embedded` need a region with `begin`",
        ));
    }

    let pattern = match (raw.regex, raw.literal, raw.lookup) {
        (Some(regex), None, None) => PatternDef::Regex(regex),
        (None, Some(literal), None) => PatternDef::Literal(literal),
        (None, None, Some(words)) => PatternDef::Lookup(words),
        _ => {
            return Err(shape(
                path,
                "rule needs exactly one of `match`, `literal`, `lookup`",
            ));
        }
    };

    let mut captures = Vec::with_capacity(raw.captures.len());
    for (key, capture) in raw.captures {
        let Ok(index) = key.parse::<u32>() else {
            return Err(shape(
                &format!("{path}.captures"),
                format!("capture key `{key}` is not a group index"),
            ));
        };
        let capture = match capture {
            RawCapture::Node(name) => CaptureDef::Node(name),
            RawCapture::Function { function } => CaptureDef::Function(function),
        };
        captures.push((index, capture));
    }
    captures.sort_by_key(|(index, _)| *index);

    let context = raw
        .context
        .into_iter()
        .enumerate()
        .map(|(i, setter)| convert_setter(setter, &format!("{path}.context[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleDef {
        node: raw.node,
        pattern,
        captures,
        lookbehind: raw.lookbehind.as_deref().map(GuardDef::parse),
        lookahead: raw.lookahead.as_deref().map(GuardDef::parse),
        context,
        rematch: raw.rematch,
    })
}

fn convert_setter(raw: RawSetter, path: &str) -> Result<SetterDef, GrammarDefError> {
    let test = match (raw.equals, raw.matches) {
        (Some(_), Some(_)) => {
            return Err(shape(path, "`equals` and `matches` are mutually exclusive"));
        }
        (Some(value), None) => Some(ConditionTest::Equals(value)),
        (None, Some(regex)) => Some(ConditionTest::Matches(regex)),
        (None, None) => raw.subject.is_some().then_some(ConditionTest::NonEmpty),
    };

    Ok(SetterDef {
        name: raw.set,
        value: raw.to,
        condition: test.map(|test| ConditionDef {
            subject: raw.subject,
            test,
        }),
        immediate: raw.immediate,
    })
}
