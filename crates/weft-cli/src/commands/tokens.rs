use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use weft_engine::{ChunkBuffer, ChunkSource, ParseConfig, Parser, TreeBuilder};
use weft_grammar::Grammar;

use super::fail;
use super::grammar_loader::{load_grammar, load_source};

pub struct TokensArgs {
    pub grammar_path: PathBuf,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub json: bool,
    pub config: ParseConfig,
}

#[derive(Serialize)]
struct ChunkRow<'g> {
    from: usize,
    to: usize,
    restartable: bool,
    open: Vec<&'g str>,
    close: Vec<&'g str>,
    tokens: Vec<TokenRow<'g>>,
}

#[derive(Serialize)]
struct TokenRow<'g> {
    node: &'g str,
    from: usize,
    to: usize,
}

pub fn run(args: TokensArgs) {
    let grammar = load_grammar(&args.grammar_path).unwrap_or_else(|err| fail(err));
    let source = load_source(args.source_path.as_ref(), args.source_text.as_deref())
        .unwrap_or_else(|err| fail(err));

    let parsed = Parser::new(&grammar, source.as_str(), TreeBuilder)
        .config(args.config)
        .parse();
    let Some(chunks) = parsed.tree.chunks() else {
        return;
    };

    let rows = rows(&grammar, chunks);
    if args.json {
        match serde_json::to_string_pretty(&rows) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("error: {}", err);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", render(&rows));
    }
}

fn rows<'g>(grammar: &'g Grammar, chunks: &ChunkBuffer) -> Vec<ChunkRow<'g>> {
    chunks
        .chunks()
        .iter()
        .map(|chunk| ChunkRow {
            from: chunk.from,
            to: chunk.to(),
            restartable: chunk.is_restartable(),
            open: chunk.open().iter().map(|&id| grammar.node_name(id)).collect(),
            close: chunk.close().iter().map(|&id| grammar.node_name(id)).collect(),
            tokens: chunk
                .tokens()
                .iter()
                .map(|token| TokenRow {
                    node: grammar.node_name(token.id),
                    from: chunk.from + token.from as usize,
                    to: chunk.from + token.to as usize,
                })
                .collect(),
        })
        .collect()
}

fn render(rows: &[ChunkRow<'_>]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if row.restartable { "" } else { " (no state)" };
        let _ = writeln!(out, "chunk {}..{}{}", row.from, row.to, marker);
        for name in &row.open {
            let _ = writeln!(out, "  open {}", name);
        }
        for token in &row.tokens {
            let _ = writeln!(out, "  {} {}..{}", token.node, token.from, token.to);
        }
        for name in &row.close {
            let _ = writeln!(out, "  close {}", name);
        }
    }
    out
}
