use std::fs;
use std::path::{Path, PathBuf};

use ftl_i18n_core::{DEFAULT_MAX_DEPTH, ParserOptions};
use ftl_i18n_runtime::FlattenOptions;
use serde::Deserialize;

use crate::error::CliError;

pub const DEFAULT_CONFIG_PATH: &str = "ftl-i18n.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub default_locale: String,
    pub source_dirs: Vec<String>,
    pub with_spans: bool,
    pub max_depth: usize,
    pub respect_comments: bool,
    pub salvage_junk: bool,
    pub interpolation_prefix: String,
    pub interpolation_suffix: String,
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            source_dirs: vec!["locales".to_string()],
            with_spans: true,
            max_depth: DEFAULT_MAX_DEPTH,
            respect_comments: true,
            salvage_junk: true,
            interpolation_prefix: "{{".to_string(),
            interpolation_suffix: "}}".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            with_spans: self.with_spans,
            max_depth: self.max_depth,
        }
    }

    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            respect_comments: self.respect_comments,
            salvage_junk: self.salvage_junk,
            interpolation_prefix: self.interpolation_prefix.clone(),
            interpolation_suffix: self.interpolation_suffix.clone(),
            max_depth: self.max_depth,
        }
    }
}

pub fn load_config(path: &Path) -> Result<CliConfig, CliError> {
    let contents = fs::read_to_string(path)?;
    let config = toml::from_str(&contents)?;
    Ok(config)
}

pub fn load_config_or_default(path: &Path) -> Result<CliConfig, CliError> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(CliConfig::default())
    }
}

/// Resolve `value` relative to the directory holding the config file.
pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        return path;
    }
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(path)
}

#[cfg(test)]
mod tests {
    use super::{CliConfig, load_config_or_default, resolve_path};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("ftl_i18n_{name}_{nanos}.toml"));
        path
    }

    #[test]
    fn uses_default_when_missing() {
        let path = temp_path("missing");
        let config = load_config_or_default(&path).expect("config");
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.parser_options().max_depth, 64);
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let path = temp_path("config");
        let contents = r#"
default_locale = "fr"
max_depth = 8
respect_comments = false
interpolation_prefix = "{"
interpolation_suffix = "}"
"#;
        fs::write(&path, contents).expect("write");
        let config = load_config_or_default(&path).expect("config");
        assert_eq!(config.default_locale, "fr");
        assert_eq!(config.source_dirs, vec!["locales".to_string()]);
        assert_eq!(config.parser_options().max_depth, 8);
        assert!(config.parser_options().with_spans);

        let flatten = config.flatten_options();
        assert!(!flatten.respect_comments);
        assert!(flatten.salvage_junk);
        assert_eq!(flatten.interpolation_prefix, "{");
        assert_eq!(flatten.max_depth, 8);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_malformed_toml() {
        let path = temp_path("broken");
        fs::write(&path, "max_depth = \"deep\"").expect("write");
        assert!(load_config_or_default(&path).is_err());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn resolves_relative_to_config_dir() {
        let config = Path::new("/srv/app/ftl-i18n.toml");
        assert_eq!(resolve_path(config, "locales"), PathBuf::from("/srv/app/locales"));
        assert_eq!(resolve_path(config, "/abs"), PathBuf::from("/abs"));
        assert_eq!(
            resolve_path(Path::new("ftl-i18n.toml"), "locales"),
            PathBuf::from("locales")
        );
        assert_eq!(CliConfig::default().source_dirs.len(), 1);
    }
}
