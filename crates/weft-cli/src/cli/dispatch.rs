//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` structs mirror the command `*Args` but are populated from clap.
//! Parse tuning flags are shared through [`ParseParams`].

use std::path::PathBuf;

use clap::ArgMatches;
use weft_engine::ParseConfig;

use crate::commands::check::CheckArgs;
use crate::commands::compile::CompileArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::reparse::ReparseArgs;
use crate::commands::tokens::TokensArgs;
use crate::commands::tree::TreeArgs;

/// Flags that tune the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseParams {
    pub chunk_capacity: Option<usize>,
    pub no_close_incomplete: bool,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            chunk_capacity: m.get_one::<usize>("chunk_capacity").copied(),
            no_close_incomplete: m.get_flag("no_close_incomplete"),
        }
    }

    pub fn to_config(self) -> ParseConfig {
        let config = ParseConfig::new().close_incomplete(!self.no_close_incomplete);
        match self.chunk_capacity {
            Some(capacity) => config.chunk_capacity(capacity),
            None => config,
        }
    }
}

pub struct CheckParams {
    pub grammar_path: PathBuf,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
        }
    }
}

pub struct DumpParams {
    pub grammar_path: PathBuf,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
        }
    }
}

pub struct CompileParams {
    pub grammar_path: PathBuf,
    pub output: PathBuf,
}

impl CompileParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            output: m.get_one::<PathBuf>("output").cloned().unwrap_or_default(),
        }
    }
}

impl From<CompileParams> for CompileArgs {
    fn from(p: CompileParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            output: p.output,
        }
    }
}

pub struct TokensParams {
    pub grammar_path: PathBuf,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub json: bool,
    pub parse: ParseParams,
}

impl TokensParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),
            json: m.get_flag("json"),
            parse: ParseParams::from_matches(m),
        }
    }
}

impl From<TokensParams> for TokensArgs {
    fn from(p: TokensParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            source_path: p.source_path,
            source_text: p.source_text,
            json: p.json,
            config: p.parse.to_config(),
        }
    }
}

pub struct TreeParams {
    pub grammar_path: PathBuf,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub parse: ParseParams,
}

impl TreeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),
            parse: ParseParams::from_matches(m),
        }
    }
}

impl From<TreeParams> for TreeArgs {
    fn from(p: TreeParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            source_path: p.source_path,
            source_text: p.source_text,
            config: p.parse.to_config(),
        }
    }
}

pub struct ReparseParams {
    pub grammar_path: PathBuf,
    pub source_path: PathBuf,
    pub from: usize,
    pub to: Option<usize>,
    pub insert: Option<String>,
    pub parse: ParseParams,
}

impl ReparseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: grammar_path(m),
            source_path: m
                .get_one::<PathBuf>("source_path")
                .cloned()
                .unwrap_or_default(),
            from: m.get_one::<usize>("from").copied().unwrap_or(0),
            to: m.get_one::<usize>("to").copied(),
            insert: m.get_one::<String>("insert").cloned(),
            parse: ParseParams::from_matches(m),
        }
    }
}

impl From<ReparseParams> for ReparseArgs {
    fn from(p: ReparseParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            source_path: p.source_path,
            from: p.from,
            to: p.to.unwrap_or(p.from),
            insert: p.insert.unwrap_or_default(),
            config: p.parse.to_config(),
        }
    }
}

/// Required positional; clap rejects the command line without it.
fn grammar_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("grammar").cloned().unwrap_or_default()
}
