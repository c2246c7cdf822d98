use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// One `<root>/<locale>/<namespace>.ftl` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSource {
    pub locale: String,
    pub namespace: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum LocaleSourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("duplicate namespace {1} in locale {0}")]
    DuplicateNamespace(String, String),
    #[error("no locales found")]
    NoLocales,
}

/// Collect every `.ftl` file one directory below each root, ordered by
/// locale then namespace.
pub fn load_sources(roots: &[PathBuf]) -> Result<Vec<LocaleSource>, LocaleSourceError> {
    let mut sources = BTreeMap::new();
    for root in roots {
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(locale) = file_name(&path) else {
                continue;
            };
            for source in load_locale_dir(&path, &locale)? {
                let key = (source.locale.clone(), source.namespace.clone());
                if sources.contains_key(&key) {
                    return Err(LocaleSourceError::DuplicateNamespace(key.0, key.1));
                }
                sources.insert(key, source);
            }
        }
    }
    if sources.is_empty() {
        return Err(LocaleSourceError::NoLocales);
    }
    debug!(files = sources.len(), "collected locale sources");
    Ok(sources.into_values().collect())
}

fn load_locale_dir(path: &Path, locale: &str) -> Result<Vec<LocaleSource>, LocaleSourceError> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(path)? {
        let file_path = entry?.path();
        if file_path.extension().and_then(|ext| ext.to_str()) != Some("ftl") {
            continue;
        }
        let Some(namespace) = file_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
        else {
            continue;
        };
        sources.push(LocaleSource {
            locale: locale.to_string(),
            namespace,
            path: file_path,
        });
    }
    Ok(sources)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
