use std::fs;
use std::path::PathBuf;

use ftl_i18n_core::{FluentParser, ParserOptions, Resource};
use thiserror::Error;
use tracing::debug;

use crate::artifacts::{to_pretty_json, write_output};
use crate::config::load_config_or_default;

#[derive(Debug, Error)]
pub enum ParseCommandError {
    #[error(transparent)]
    Cli(#[from] crate::error::CliError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub input: PathBuf,
    pub out: Option<PathBuf>,
    pub no_spans: bool,
    pub config_path: PathBuf,
}

/// Dump the syntax tree of `input` as JSON.
pub fn run_parse(options: &ParseOptions) -> Result<Resource, ParseCommandError> {
    let config = load_config_or_default(&options.config_path)?;
    let source = fs::read_to_string(&options.input)?;

    let mut parser_options = config.parser_options();
    if options.no_spans {
        parser_options = ParserOptions {
            with_spans: false,
            ..parser_options
        };
    }
    let resource = FluentParser::new(parser_options).parse(&source);
    debug!(file = %options.input.display(), entries = resource.body.len(), "parsed resource");

    write_output(options.out.as_deref(), &to_pretty_json(&resource)?)?;
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::{ParseOptions, run_parse};
    use serde_json::Value;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("ftl_i18n_parse_{nanos}"));
        fs::create_dir_all(&path).expect("dir");
        path
    }

    fn dump(dir: &PathBuf, no_spans: bool) -> Value {
        run_parse(&ParseOptions {
            input: dir.join("app.ftl"),
            out: Some(dir.join("ast.json")),
            no_spans,
            config_path: dir.join("ftl-i18n.toml"),
        })
        .expect("parse");
        serde_json::from_str(&fs::read_to_string(dir.join("ast.json")).expect("read"))
            .expect("json")
    }

    #[test]
    fn dumps_tagged_nodes() {
        let dir = temp_dir();
        fs::write(dir.join("app.ftl"), "hello = Hi { $name }\n").expect("write");

        let tree = dump(&dir, false);
        let message = &tree["body"][0];
        assert_eq!(message["type"], "Message");
        assert_eq!(message["id"]["name"], "hello");
        assert_eq!(message["span"]["start"], 0);
        assert_eq!(message["span"]["end"], 20);
        let placeable = &message["value"]["elements"][1];
        assert_eq!(placeable["type"], "Placeable");
        assert_eq!(placeable["expression"]["type"], "VariableReference");

        let tree = dump(&dir, true);
        assert!(tree["body"][0].get("span").is_none());
        fs::remove_dir_all(&dir).ok();
    }
}
