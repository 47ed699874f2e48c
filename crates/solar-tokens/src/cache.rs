//! Change detection between runs.
//!
//! `token-cache.json` in the output directory records the SHA-256 of the
//! input file, a digest of the configuration, and a snapshot of every raw
//! token value keyed by `path@context`. A build whose input and configuration
//! both match the cache (and whose outputs all exist) is skipped; otherwise the snapshot is diffed against the
//! new extraction to report what changed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{Result, TokenError};
use crate::extract::Extraction;

/// File name of the cache, relative to the output directory.
pub const CACHE_FILE: &str = "token-cache.json";

/// Hex-encoded SHA-256 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCache {
    pub input_hash: String,
    /// Digest of the configuration the outputs were built with.
    #[serde(default)]
    pub config_hash: String,
    /// Artifacts written by the run, relative to the output directory.
    #[serde(default)]
    pub outputs: Vec<PathBuf>,
    /// Raw values keyed by `path@context`.
    pub tokens: BTreeMap<String, String>,
}

impl TokenCache {
    /// Snapshots an extraction. Later sets win, as they do in resolution.
    pub fn snapshot(input_hash: impl Into<String>, extraction: &Extraction) -> Self {
        let tokens = extraction
            .tokens()
            .map(|token| {
                (
                    format!("{}@{}", token.path, token.context),
                    token.value.to_string(),
                )
            })
            .collect();
        Self {
            input_hash: input_hash.into(),
            config_hash: String::new(),
            outputs: Vec::new(),
            tokens,
        }
    }

    /// Records the configuration digest. Returns self for chaining.
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    /// Records the artifacts a run produced. Returns self for chaining.
    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.outputs = outputs.into_iter().collect();
        self.outputs.sort();
        self
    }

    /// Whether a run can be skipped: both digests match and every recorded
    /// artifact still exists under `output_dir`.
    pub fn is_current(&self, input_hash: &str, config_hash: &str, output_dir: &Path) -> bool {
        self.input_hash == input_hash
            && self.config_hash == config_hash
            && !self.outputs.is_empty()
            && self.outputs.iter().all(|p| output_dir.join(p).is_file())
    }

    /// Reads a cache file. A missing file is `None`; an unreadable or corrupt
    /// one is logged and also treated as absent.
    pub fn load(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable token cache");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring corrupt token cache");
                None
            }
        }
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn render(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self).map_err(|e| TokenError::Render {
            artifact: CACHE_FILE.to_string(),
            message: e.to_string(),
        })?;
        json.push('\n');
        Ok(json)
    }

    /// Compares this (newer) snapshot against a previous one.
    pub fn diff(&self, previous: Option<&TokenCache>) -> ChangeReport {
        let empty = BTreeMap::new();
        let before = previous.map(|p| &p.tokens).unwrap_or(&empty);

        let mut report = ChangeReport::default();
        for (key, value) in &self.tokens {
            match before.get(key) {
                None => report.added.push(key.clone()),
                Some(old) if old != value => report.changed.push(key.clone()),
                Some(_) => {}
            }
        }
        report.removed = before
            .keys()
            .filter(|key| !self.tokens.contains_key(*key))
            .cloned()
            .collect();
        report
    }
}

/// Token-level differences between two runs, as `path@context` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl ChangeReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}
