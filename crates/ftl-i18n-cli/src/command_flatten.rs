use std::fs;
use std::path::PathBuf;

use ftl_i18n_core::{FluentParser, ParserOptions};
use ftl_i18n_runtime::{FlatResource, FlattenError, flatten};
use thiserror::Error;
use tracing::info;

use crate::artifacts::{to_pretty_json, write_output};
use crate::config::load_config_or_default;

#[derive(Debug, Error)]
pub enum FlattenCommandError {
    #[error(transparent)]
    Cli(#[from] crate::error::CliError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Flatten(#[from] FlattenError),
}

#[derive(Debug, Clone)]
pub struct FlattenCommandOptions {
    pub input: PathBuf,
    pub out: Option<PathBuf>,
    pub no_comments: bool,
    pub config_path: PathBuf,
}

pub fn run_flatten(options: &FlattenCommandOptions) -> Result<FlatResource, FlattenCommandError> {
    let config = load_config_or_default(&options.config_path)?;
    let source = fs::read_to_string(&options.input)?;

    let parser = FluentParser::new(ParserOptions {
        with_spans: false,
        ..config.parser_options()
    });
    let mut flatten_options = config.flatten_options();
    if options.no_comments {
        flatten_options.respect_comments = false;
    }
    let flat = flatten(&parser.parse(&source), &flatten_options)?;

    write_output(options.out.as_deref(), &to_pretty_json(&flat)?)?;
    info!(file = %options.input.display(), keys = flat.len(), "flattened resource");
    Ok(flat)
}
