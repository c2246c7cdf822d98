use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Fetches resource text and stores missing keys. Non-2xx statuses are
/// returned as responses; `Err` is reserved for failures to talk at all.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Response, TransportError>;

    fn post(&self, url: &str, payload: &Value) -> Result<Response, TransportError>;
}

/// Serves urls as paths below `root`. Posted keys are merged into a JSON
/// object stored next to the resource as `<url>.json`.
#[derive(Debug, Clone)]
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, TransportError> {
        let relative = Path::new(url.trim_start_matches('/'));
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(TransportError::InvalidUrl(url.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl Transport for FileTransport {
    fn get(&self, url: &str) -> Result<Response, TransportError> {
        let path = self.resolve(url)?;
        match fs::read_to_string(&path) {
            Ok(body) => {
                debug!(path = %path.display(), "read resource");
                Ok(Response::new(200, body))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Response::new(404, "")),
            Err(err) => Ok(Response::new(500, err.to_string())),
        }
    }

    fn post(&self, url: &str, payload: &Value) -> Result<Response, TransportError> {
        let Value::Object(entries) = payload else {
            return Err(TransportError::NotAnObject(url.to_string()));
        };

        let mut path = self.resolve(url)?.into_os_string();
        path.push(".json");
        let path = PathBuf::from(path);

        let mut stored = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Value>(&contents)? {
                Value::Object(map) => map,
                _ => return Err(TransportError::NotAnObject(path.display().to_string())),
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Map::new(),
            Err(err) => return Err(err.into()),
        };
        for (key, value) in entries {
            stored.insert(key.clone(), value.clone());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, &Value::Object(stored))?;
        debug!(path = %path.display(), keys = entries.len(), "stored missing keys");
        Ok(Response::new(200, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::{FileTransport, Transport};
    use crate::error::TransportError;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("ftl_i18n_{name}_{nanos}"));
        fs::create_dir_all(&path).expect("create dir");
        path
    }

    #[test]
    fn get_maps_missing_files_to_404() {
        let root = temp_dir("transport_get");
        fs::create_dir_all(root.join("locales/en")).expect("dirs");
        fs::write(root.join("locales/en/app.ftl"), "hello = Hello\n").expect("write");

        let transport = FileTransport::new(&root);
        let found = transport.get("/locales/en/app.ftl").expect("get");
        assert_eq!(found.status, 200);
        assert_eq!(found.body, "hello = Hello\n");

        let missing = transport.get("/locales/de/app.ftl").expect("get");
        assert_eq!(missing.status, 404);
    }

    #[test]
    fn rejects_urls_escaping_the_root() {
        let transport = FileTransport::new(temp_dir("transport_escape"));
        let err = transport.get("/locales/../../etc/passwd").expect_err("escape");
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[test]
    fn post_merges_into_existing_store() {
        let root = temp_dir("transport_post");
        let transport = FileTransport::new(&root);
        transport
            .post("/locales/add/en/app", &json!({ "a": "A" }))
            .expect("first post");
        transport
            .post("/locales/add/en/app", &json!({ "b": "" }))
            .expect("second post");

        let stored = fs::read_to_string(root.join("locales/add/en/app.json")).expect("read");
        let value: serde_json::Value = serde_json::from_str(&stored).expect("json");
        assert_eq!(value, json!({ "a": "A", "b": "" }));

        let err = transport
            .post("/locales/add/en/app", &json!(["not", "an", "object"]))
            .expect_err("array payload");
        assert!(matches!(err, TransportError::NotAnObject(_)));
    }
}
