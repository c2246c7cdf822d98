use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("unsupported expression in {key}: {detail}")]
    UnsupportedExpression { key: String, detail: String },
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("expected a json object: {0}")]
    NotAnObject(String),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed loading {url} (status {status})")]
    LoadFailed { url: String, status: u16, retry: bool },
    #[error("failed parsing {url} to json: {source}")]
    ParseFailed {
        url: String,
        #[source]
        source: FlattenError,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl BackendError {
    /// Server side failures may succeed on a later attempt; everything else
    /// is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::LoadFailed { retry: true, .. })
    }
}
