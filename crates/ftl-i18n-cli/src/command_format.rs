use std::fs;
use std::path::PathBuf;

use ftl_i18n_core::{FluentParser, FluentSerializer, SerializerOptions};
use thiserror::Error;
use tracing::{info, warn};

use crate::artifacts::write_output;
use crate::config::load_config_or_default;

#[derive(Debug, Error)]
pub enum FormatCommandError {
    #[error(transparent)]
    Cli(#[from] crate::error::CliError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub input: PathBuf,
    pub out: Option<PathBuf>,
    pub with_junk: bool,
    pub config_path: PathBuf,
}

/// Rewrite `input` in canonical form. Returns the formatted text after
/// writing it to `out` (or stdout).
pub fn run_format(options: &FormatOptions) -> Result<String, FormatCommandError> {
    let config = load_config_or_default(&options.config_path)?;
    let source = fs::read_to_string(&options.input)?;
    let resource = FluentParser::new(config.parser_options()).parse(&source);

    let junk = resource.junk().count();
    if junk > 0 && !options.with_junk {
        warn!(
            file = %options.input.display(),
            junk,
            "dropping entries that failed to parse"
        );
    }

    let serializer = FluentSerializer::new(SerializerOptions {
        with_junk: options.with_junk,
    });
    let text = serializer.serialize(&resource);
    write_output(options.out.as_deref(), &text)?;
    info!(file = %options.input.display(), entries = resource.body.len(), "formatted resource");
    Ok(text)
}
