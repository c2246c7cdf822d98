use std::fs;
use std::path::PathBuf;

use ftl_i18n_core::FluentParser;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::load_config_or_default;
use crate::diagnostic::{Diagnostic, collect_diagnostics};

#[derive(Debug, Error)]
pub enum CheckCommandError {
    #[error("config error: {0}")]
    Config(#[from] crate::error::CliError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("check failed with {0} diagnostics")]
    Failed(usize),
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub input: PathBuf,
    pub config_path: PathBuf,
}

/// Parse `input` and report every Junk annotation. Diagnostics are printed
/// one per line and returned; any diagnostic fails the check.
pub fn run_check(options: &CheckOptions) -> Result<Vec<Diagnostic>, CheckCommandError> {
    let config = load_config_or_default(&options.config_path)?;
    let source = fs::read_to_string(&options.input)?;
    let file = options.input.display().to_string();

    let resource = FluentParser::new(config.parser_options()).parse(&source);
    debug!(file = %file, entries = resource.body.len(), "parsed resource");
    let diagnostics = collect_diagnostics(&resource, &file, &source);

    for diagnostic in &diagnostics {
        println!("{diagnostic}");
    }
    if diagnostics.is_empty() {
        info!(file = %file, "no syntax errors");
        Ok(diagnostics)
    } else {
        Err(CheckCommandError::Failed(diagnostics.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CheckCommandError, CheckOptions, run_check};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("ftl_i18n_check_{nanos}"));
        fs::create_dir_all(&path).expect("dir");
        path
    }

    #[test]
    fn clean_file_passes() {
        let dir = temp_dir();
        let input = dir.join("app.ftl");
        fs::write(&input, "hello = Hello\n    .title = Hi\n").expect("write");
        let diagnostics = run_check(&CheckOptions {
            input,
            config_path: dir.join("ftl-i18n.toml"),
        })
        .expect("check");
        assert!(diagnostics.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn junk_fails_the_check() {
        let dir = temp_dir();
        let input = dir.join("app.ftl");
        fs::write(&input, "hello = Hello\nbye = { $x\nok = Ok\n").expect("write");
        let err = run_check(&CheckOptions {
            input,
            config_path: dir.join("ftl-i18n.toml"),
        })
        .expect_err("junk");
        assert!(matches!(err, CheckCommandError::Failed(1)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn config_depth_limit_applies() {
        let dir = temp_dir();
        let input = dir.join("app.ftl");
        fs::write(&input, "deep = {{{ 1 }}}\n").expect("write");
        let config_path = dir.join("ftl-i18n.toml");
        fs::write(&config_path, "max_depth = 2\n").expect("config");
        let err = run_check(&CheckOptions { input, config_path }).expect_err("too deep");
        assert!(matches!(err, CheckCommandError::Failed(1)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = temp_dir();
        let err = run_check(&CheckOptions {
            input: dir.join("absent.ftl"),
            config_path: dir.join("ftl-i18n.toml"),
        })
        .expect_err("missing");
        assert!(matches!(err, CheckCommandError::Io(_)));
        fs::remove_dir_all(&dir).ok();
    }
}
