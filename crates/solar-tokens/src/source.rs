//! Loading the TokenStudio `tokens.json` export.
//!
//! The file is parsed into an order-preserving [`Node`] tree. Object key order
//! is kept exactly as authored, since extraction order (and therefore module
//! output order) follows the source. Duplicate keys inside one object are
//! rejected while parsing instead of silently overwriting each other.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::error::{Result, TokenError};

/// A node of the raw token tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A JSON object, with entries in source order.
    Object(Vec<(String, Node)>),
    Array(Vec<Node>),
    String(String),
    /// A JSON number, kept as its textual form.
    Number(String),
    Bool(bool),
    Null,
}

impl Node {
    /// Looks up an object entry by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Returns the string content of a `String` node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short description of the node type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Object(_) => "object",
            Node::Array(_) => "array",
            Node::String(_) => "string",
            Node::Number(_) => "number",
            Node::Bool(_) => "boolean",
            Node::Null => "null",
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Node, E> {
        Ok(Node::Number(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Node, E> {
        Ok(Node::Number(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Node, E> {
        Ok(Node::Number(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Node, E> {
        Ok(Node::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Node, D::Error> {
        Node::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Node, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Node, A::Error> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        while let Some(key) = map.next_key::<String>()? {
            if !seen.insert(key.clone()) {
                return Err(de::Error::custom(format!("duplicate key `{}`", key)));
            }
            let value: Node = map.next_value()?;
            entries.push((key, value));
        }
        Ok(Node::Object(entries))
    }
}

/// A parsed token file: the ordered top-level token sets.
#[derive(Debug, Clone)]
pub struct TokenSource {
    sets: Vec<(String, Node)>,
    origin: Option<PathBuf>,
}

impl TokenSource {
    /// Parses token JSON. `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Parse`] for invalid JSON, duplicate keys, or a
    /// document whose root is not an object.
    pub fn parse(json: &str, origin: Option<&Path>) -> Result<Self> {
        let origin = origin.map(Path::to_path_buf);
        let root: Node = serde_json::from_str(json).map_err(|e| TokenError::Parse {
            path: origin.clone(),
            message: e.to_string(),
        })?;

        match root {
            Node::Object(sets) => Ok(Self { sets, origin }),
            other => Err(TokenError::Parse {
                path: origin,
                message: format!("expected a JSON object at the root, found {}", other.type_name()),
            }),
        }
    }

    /// Reads and parses a token file.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let source = TokenSource::from_file("tokens.json")?;
    /// for (key, _) in source.sets() {
    ///     println!("{}", key);
    /// }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TokenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, Some(path))
    }

    /// Top-level entries (token sets and `$`-metadata) in source order.
    pub fn sets(&self) -> &[(String, Node)] {
        &self.sets
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

impl std::str::FromStr for TokenSource {
    type Err = TokenError;

    fn from_str(json: &str) -> Result<Self> {
        Self::parse(json, None)
    }
}
