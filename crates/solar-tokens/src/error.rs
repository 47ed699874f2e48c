//! Error types for the token pipeline.
//!
//! Every variant of [`TokenError`] is fatal: the run stops and nothing is
//! written. Recoverable problems (dangling aliases, composite values, dropped
//! utility classes) are collected as [`Warnings`](crate::Warnings) instead.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::token::TokenPath;

/// Pipeline stage an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Load,
    Extract,
    Resolve,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Config => write!(f, "config"),
            Stage::Load => write!(f, "load"),
            Stage::Extract => write!(f, "extract"),
            Stage::Resolve => write!(f, "resolve"),
            Stage::Write => write!(f, "write"),
        }
    }
}

/// A chain of alias references that leads back to its start.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CycleError {
    /// The chain, with the first path repeated at the end (`a -> b -> a`).
    pub chain: Vec<TokenPath>,
}

impl CycleError {
    /// Rotates the cycle so it starts at its smallest path.
    ///
    /// The same cycle reached from different entry points compares equal
    /// after normalization.
    pub fn normalized(&self) -> Self {
        let ring = &self.chain[..self.chain.len().saturating_sub(1)];
        let Some(start) = ring
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(i, _)| i)
        else {
            return self.clone();
        };
        let mut chain: Vec<TokenPath> = ring[start..]
            .iter()
            .chain(ring[..start].iter())
            .cloned()
            .collect();
        chain.push(ring[start].clone());
        Self { chain }
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.chain.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" -> "))
    }
}

/// Fatal errors raised by the token pipeline.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token file could not be read.
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token file is not valid JSON, or not a JSON object.
    #[error("invalid token file{}: {}", location(.path), .message)]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    /// A top-level token set is not declared in the schema.
    #[error("unknown token set '{}' (allowed groups: {})", .key, .allowed.join(", "))]
    UnknownTokenSet { key: String, allowed: Vec<String> },

    /// Two tokens in one set share a path.
    #[error("duplicate token path '{}' in set '{}'", .path, .set)]
    DuplicatePath { set: String, path: TokenPath },

    /// Two distinct paths in one set produce the same CSS variable name.
    #[error("tokens '{}' and '{}' in set '{}' both map to --{}", .first, .second, .set, .name)]
    NameCollision {
        set: String,
        name: String,
        first: TokenPath,
        second: TokenPath,
    },

    /// A node does not follow the TokenStudio token/group structure.
    #[error("malformed token at '{}': {}", .location, .message)]
    MalformedToken { location: String, message: String },

    /// Alias chains that loop back on themselves.
    #[error("circular token references: {}", join_cycles(.cycles))]
    CircularReference { cycles: Vec<CycleError> },

    /// An output artifact could not be rendered.
    #[error("failed to render {}: {}", .artifact, .message)]
    Render { artifact: String, message: String },

    /// An output artifact could not be written.
    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is missing or invalid.
    #[error("invalid configuration{}: {}", location(.path), .message)]
    Config {
        path: Option<PathBuf>,
        message: String,
    },
}

impl TokenError {
    /// The stage that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            TokenError::Read { .. } | TokenError::Parse { .. } => Stage::Load,
            TokenError::UnknownTokenSet { .. }
            | TokenError::DuplicatePath { .. }
            | TokenError::NameCollision { .. }
            | TokenError::MalformedToken { .. } => Stage::Extract,
            TokenError::CircularReference { .. } => Stage::Resolve,
            TokenError::Render { .. } | TokenError::Write { .. } => Stage::Write,
            TokenError::Config { .. } => Stage::Config,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        TokenError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

fn join_cycles(cycles: &[CycleError]) -> String {
    cycles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, TokenError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn path(dotted: &str) -> TokenPath {
        TokenPath::parse(dotted).unwrap()
    }

    #[test]
    fn test_cycle_display() {
        let err = CycleError {
            chain: vec![path("a"), path("b"), path("a")],
        };
        assert_eq!(err.to_string(), "a -> b -> a");
    }

    #[test]
    fn test_cycle_normalized_rotation() {
        let from_b = CycleError {
            chain: vec![path("b"), path("c"), path("a"), path("b")],
        };
        let from_a = CycleError {
            chain: vec![path("a"), path("b"), path("c"), path("a")],
        };
        assert_eq!(from_b.normalized(), from_a);
        assert_eq!(from_a.normalized(), from_a);
    }

    #[test]
    fn test_self_cycle_normalized() {
        let err = CycleError {
            chain: vec![path("self"), path("self")],
        };
        assert_eq!(err.normalized(), err);
    }

    #[test]
    fn test_circular_reference_display() {
        let err = TokenError::CircularReference {
            cycles: vec![CycleError {
                chain: vec![path("a"), path("b"), path("a")],
            }],
        };
        let msg = err.to_string();
        assert!(msg.contains("circular"));
        assert!(msg.contains("a -> b -> a"));
        assert_eq!(err.stage(), Stage::Resolve);
    }

    #[test]
    fn test_parse_error_location() {
        let err = TokenError::Parse {
            path: Some(PathBuf::from("tokens.json")),
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid token file tokens.json: expected value"
        );
        assert_eq!(err.stage(), Stage::Load);
    }

    #[test]
    fn test_unknown_set_lists_allowed() {
        let err = TokenError::UnknownTokenSet {
            key: "colours".to_string(),
            allowed: vec!["brands".to_string(), "color".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("colours"));
        assert!(msg.contains("brands, color"));
        assert_eq!(err.stage(), Stage::Extract);
    }
}
