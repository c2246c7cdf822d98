use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::BackendError;
use crate::flatten::{FlatResource, FlattenOptions, ftl_to_flat};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOptions {
    /// Url template for reading a namespace; `{{lng}}` and `{{ns}}` are
    /// substituted.
    pub load_path: String,
    /// Url template that missing keys are posted to.
    pub add_path: String,
    pub flatten: FlattenOptions,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            load_path: "/locales/{{lng}}/{{ns}}.ftl".to_string(),
            add_path: "/locales/add/{{lng}}/{{ns}}".to_string(),
            flatten: FlattenOptions::default(),
        }
    }
}

pub fn interpolate_path(template: &str, lng: &str, ns: &str) -> String {
    template.replace("{{lng}}", lng).replace("{{ns}}", ns)
}

/// Loads `.ftl` namespaces through a [`Transport`] and hands them out as
/// flat translation tables.
#[derive(Debug, Clone)]
pub struct Backend<T> {
    transport: T,
    options: BackendOptions,
}

impl<T: Transport> Backend<T> {
    pub fn new(transport: T, options: BackendOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &BackendOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn read(&self, lng: &str, ns: &str) -> Result<FlatResource, BackendError> {
        let url = interpolate_path(&self.options.load_path, lng, ns);
        self.load_url(&url)
    }

    pub fn load_url(&self, url: &str) -> Result<FlatResource, BackendError> {
        let response = self.transport.get(url)?;
        if (400..600).contains(&response.status) {
            let retry = response.status >= 500;
            warn!(url, status = response.status, retry, "failed loading resource");
            return Err(BackendError::LoadFailed {
                url: url.to_string(),
                status: response.status,
                retry,
            });
        }

        let flat = ftl_to_flat(&response.body, &self.options.flatten).map_err(|source| {
            BackendError::ParseFailed {
                url: url.to_string(),
                source,
            }
        })?;
        debug!(url, keys = flat.len(), "loaded resource");
        Ok(flat)
    }

    /// Report a missing key to every language in `languages`. Rejected posts
    /// are logged, not returned.
    pub fn create(
        &self,
        languages: &[&str],
        ns: &str,
        key: &str,
        fallback: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut payload = Map::new();
        payload.insert(
            key.to_string(),
            Value::String(fallback.unwrap_or_default().to_string()),
        );
        let payload = Value::Object(payload);

        for lng in languages {
            let url = interpolate_path(&self.options.add_path, lng, ns);
            let response = self.transport.post(&url, &payload)?;
            if response.status >= 400 {
                warn!(%url, status = response.status, key, "missing key was rejected");
            } else {
                info!(%url, key, "reported missing key");
            }
        }
        Ok(())
    }
}
