use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use weft_grammar::GrammarBuilder;

use super::grammar_loader::load_definition;
use super::{CliError, fail};

pub struct CompileArgs {
    pub grammar_path: PathBuf,
    pub output: PathBuf,
}

pub fn run(args: CompileArgs) {
    if let Err(err) = compile(&args.grammar_path, &args.output) {
        fail(err);
    }
}

/// Builds the grammar once to validate it, then writes the definition in
/// binary form.
pub fn compile(grammar_path: &Path, output: &Path) -> Result<usize, CliError> {
    let def = load_definition(grammar_path)?;
    let bytes = def.to_binary()?;
    GrammarBuilder::new(def).build()?;

    fs::write(output, &bytes).map_err(|source| CliError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    info!(output = %output.display(), bytes = bytes.len(), "compiled grammar");
    Ok(bytes.len())
}
