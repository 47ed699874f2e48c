//! Token paths and CSS variable naming.

use std::fmt;

use serde::{Serialize, Serializer};

/// Location of a token inside the source tree, as ordered segments.
///
/// Displayed dotted (`color.brand.primary.rest`), which is also the syntax
/// used inside alias references (`{color.brand.primary.rest}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPath(Vec<String>);

impl TokenPath {
    /// Builds a path from segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses a dotted path, as written inside an alias reference.
    ///
    /// Returns `None` for empty input or empty segments (`a..b`, `.a`).
    ///
    /// ```rust
    /// use solar_tokens::TokenPath;
    ///
    /// let path = TokenPath::parse("color.brand.primary").unwrap();
    /// assert_eq!(path.segments().len(), 3);
    /// assert!(TokenPath::parse("color..primary").is_none());
    /// ```
    pub fn parse(dotted: &str) -> Option<Self> {
        let dotted = dotted.trim();
        if dotted.is_empty() {
            return None;
        }
        let segments: Vec<String> = dotted.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Derives the CSS custom-property name (without the leading `--`).
    ///
    /// Segments are lowercased and joined with `-`. Characters that are not
    /// valid in an unescaped custom-property name are replaced: `%` becomes
    /// `percent`, anything else becomes `-`, and runs of `-` collapse.
    ///
    /// ```rust
    /// use solar_tokens::TokenPath;
    ///
    /// let path = TokenPath::parse("color.Brand.primary.rest").unwrap();
    /// assert_eq!(path.css_name(), "color-brand-primary-rest");
    ///
    /// let scale = TokenPath::new(["16px-scale", "12%"]);
    /// assert_eq!(scale.css_name(), "16px-scale-12percent");
    /// ```
    pub fn css_name(&self) -> String {
        self.0
            .iter()
            .map(|segment| css_segment(segment))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

fn css_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for ch in segment.chars() {
        match ch {
            c if c.is_ascii_alphanumeric() => out.push(c.to_ascii_lowercase()),
            '_' => out.push('_'),
            '%' => out.push_str("percent"),
            _ => {
                if !out.ends_with('-') {
                    out.push('-');
                }
            }
        }
    }
    out.trim_matches('-').to_string()
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl Serialize for TokenPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
