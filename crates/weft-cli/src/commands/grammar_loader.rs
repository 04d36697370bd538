use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;
use weft_core::GrammarDef;
use weft_grammar::{Grammar, GrammarBuilder};

use super::CliError;

/// Reads a grammar definition. Files ending in `.bin` are compiled
/// grammars, anything else is JSON.
pub fn load_definition(path: &Path) -> Result<GrammarDef, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let def = if is_binary(path) {
        GrammarDef::from_binary(&bytes)?
    } else {
        let json = String::from_utf8(bytes).map_err(|_| CliError::NotUtf8 {
            path: path.to_path_buf(),
        })?;
        GrammarDef::from_json(&json)?
    };
    debug!(path = %path.display(), name = %def.name, "loaded grammar definition");
    Ok(def)
}

pub fn load_grammar(path: &Path) -> Result<Grammar, CliError> {
    let def = load_definition(path)?;
    Ok(GrammarBuilder::new(def).build()?)
}

fn is_binary(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "bin")
}

/// Inline text wins over the path. `-` reads stdin.
pub fn load_source(path: Option<&PathBuf>, text: Option<&str>) -> Result<String, CliError> {
    if let Some(text) = text {
        return Ok(text.to_owned());
    }
    let Some(path) = path else {
        return Err(CliError::MissingSource);
    };

    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })
}
