use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub schema: u32,
    pub default_locale: String,
    pub supported_locales: Vec<String>,
    pub namespaces: Vec<String>,
    /// locale -> namespace -> built resource
    pub resources: BTreeMap<String, BTreeMap<String, ResourceEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub url: String,
    pub hash: String,
    pub size: u64,
    pub keys: usize,
    pub source_hash: String,
}

impl Manifest {
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("sha256:{}", hex::encode(sha256_raw(bytes)))
}

pub fn sha256_raw(bytes: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}
