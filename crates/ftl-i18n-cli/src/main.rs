#![forbid(unsafe_code)]

mod artifacts;
mod cli;
mod command_build;
mod command_check;
mod command_flatten;
mod command_format;
mod command_parse;
mod config;
mod diagnostic;
mod error;
mod locale_sources;
mod manifest;

use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{DEFAULT_CONFIG_PATH, load_config_or_default};

const LOG_ENV: &str = "FTL_I18N_LOG";

fn main() -> ExitCode {
    setup_logging();
    match cli::run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// `FTL_I18N_LOG` wins; otherwise the `log_level` of `ftl-i18n.toml` in the
/// working directory, then `warn`.
fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = load_config_or_default(Path::new(DEFAULT_CONFIG_PATH))
            .map(|config| config.log_level)
            .unwrap_or_else(|_| "warn".to_string());
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .init();
}
