use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use ftl_i18n_core::{FluentParser, ParserOptions};
use ftl_i18n_runtime::{FlattenError, flatten};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::artifacts::to_pretty_json;
use crate::config::{load_config_or_default, resolve_path};
use crate::diagnostic::collect_diagnostics;
use crate::locale_sources::{LocaleSourceError, load_sources};
use crate::manifest::{Manifest, ResourceEntry, sha256_hex};

#[derive(Debug, Error)]
pub enum BuildCommandError {
    #[error(transparent)]
    Cli(#[from] crate::error::CliError),
    #[error(transparent)]
    Sources(#[from] LocaleSourceError),
    #[error("flatten error in {path}: {source}")]
    Flatten {
        path: String,
        #[source]
        source: FlattenError,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config_path: PathBuf,
    pub out_dir: PathBuf,
}

/// Flatten every `<source_dir>/<locale>/<namespace>.ftl` into
/// `<out>/<locale>/<namespace>.json` and describe the result in
/// `<out>/manifest.json`.
pub fn run_build(options: &BuildOptions) -> Result<Manifest, BuildCommandError> {
    let config = load_config_or_default(&options.config_path)?;
    let roots: Vec<PathBuf> = config
        .source_dirs
        .iter()
        .map(|root| resolve_path(&options.config_path, root))
        .collect();
    let sources = load_sources(&roots)?;

    let parser = FluentParser::new(ParserOptions {
        with_spans: true,
        ..config.parser_options()
    });
    let flatten_options = config.flatten_options();

    let mut resources: BTreeMap<String, BTreeMap<String, ResourceEntry>> = BTreeMap::new();
    let mut namespaces = BTreeSet::new();

    for source in sources {
        let file = source.path.display().to_string();
        let text = fs::read_to_string(&source.path)?;
        let resource = parser.parse(&text);
        for diagnostic in collect_diagnostics(&resource, &file, &text) {
            warn!(%diagnostic, "syntax error");
        }

        let flat = flatten(&resource, &flatten_options).map_err(|source| {
            BuildCommandError::Flatten {
                path: file.clone(),
                source,
            }
        })?;
        let json = to_pretty_json(&flat)?;

        let url = format!("{}/{}.json", source.locale, source.namespace);
        let locale_dir = options.out_dir.join(&source.locale);
        fs::create_dir_all(&locale_dir)?;
        fs::write(locale_dir.join(format!("{}.json", source.namespace)), &json)?;
        debug!(%url, keys = flat.len(), "wrote namespace");

        namespaces.insert(source.namespace.clone());
        resources.entry(source.locale).or_default().insert(
            source.namespace,
            ResourceEntry {
                url,
                hash: sha256_hex(json.as_bytes()),
                size: json.len() as u64,
                keys: flat.len(),
                source_hash: sha256_hex(text.as_bytes()),
            },
        );
    }

    let supported_locales: Vec<String> = resources.keys().cloned().collect();
    if !resources.contains_key(&config.default_locale) {
        warn!(locale = %config.default_locale, "default locale has no sources");
    }
    let manifest = Manifest {
        schema: 1,
        default_locale: config.default_locale,
        supported_locales,
        namespaces: namespaces.into_iter().collect(),
        resources,
    };

    fs::create_dir_all(&options.out_dir)?;
    let manifest_path = options.out_dir.join("manifest.json");
    fs::write(&manifest_path, manifest.to_canonical_bytes())?;
    info!(
        out = %options.out_dir.display(),
        locales = manifest.supported_locales.len(),
        namespaces = manifest.namespaces.len(),
        "build complete"
    );
    Ok(manifest)
}
