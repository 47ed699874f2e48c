//! The token data model shared by every pipeline stage.
//!
//! - [`Token`]: one leaf of the source tree, as authored
//! - [`ResolvedToken`]: a token after alias resolution, ready for emission
//! - [`Context`]: the theme/brand scope a token applies under
//!
//! All of these are rebuilt from `tokens.json` on every run.

mod kind;
mod path;
mod value;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use kind::TokenKind;
pub use path::TokenPath;
pub use value::{TokenValue, ValuePart};

/// Option tokens hold primitive values; semantic tokens give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Option,
    Semantic,
}

impl Category {
    /// Directory name used for this bucket's generated modules.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Option => "option-tokens",
            Category::Semantic => "semantic-tokens",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Option => write!(f, "option"),
            Category::Semantic => write!(f, "semantic"),
        }
    }
}

/// The theme/brand scope a token is declared in.
///
/// The default context (no theme, no brand) is the `:root` scope. Contexts
/// order as root, themes, brands, then theme+brand combinations, which is
/// also the order their CSS blocks are emitted in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Context {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl Context {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn theme(name: impl Into<String>) -> Self {
        Self {
            theme: Some(name.into()),
            brand: None,
        }
    }

    pub fn brand(name: impl Into<String>) -> Self {
        Self {
            theme: None,
            brand: Some(name.into()),
        }
    }

    pub fn combined(theme: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            theme: Some(theme.into()),
            brand: Some(brand.into()),
        }
    }

    pub fn is_root(&self) -> bool {
        self.theme.is_none() && self.brand.is_none()
    }

    fn rank(&self) -> u8 {
        match (&self.theme, &self.brand) {
            (None, None) => 0,
            (Some(_), None) => 1,
            (None, Some(_)) => 2,
            (Some(_), Some(_)) => 3,
        }
    }
}

impl Ord for Context {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.theme.cmp(&other.theme))
            .then_with(|| self.brand.cmp(&other.brand))
    }
}

impl PartialOrd for Context {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.theme, &self.brand) {
            (None, None) => write!(f, "root"),
            (Some(theme), None) => write!(f, "theme={}", theme),
            (None, Some(brand)) => write!(f, "brand={}", brand),
            (Some(theme), Some(brand)) => write!(f, "theme={},brand={}", theme, brand),
        }
    }
}

/// A token as authored in the source tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub path: TokenPath,
    pub value: TokenValue,
    pub category: Category,
    pub kind: TokenKind,
    /// Output module this token is written to (`colors`, `brands`, ...).
    pub module: String,
    pub context: Context,
    pub description: Option<String>,
}

impl Token {
    /// CSS custom-property name, without the leading `--`.
    pub fn css_name(&self) -> String {
        self.path.css_name()
    }
}

/// A token whose value has been followed to a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    /// CSS custom-property name, without the leading `--`.
    pub name: String,
    /// Alias-free value.
    pub value: String,
    pub path: TokenPath,
    pub category: Category,
    pub kind: TokenKind,
    pub context: Context,
}

impl ResolvedToken {
    /// The `--name: value;` declaration for this token.
    pub fn declaration(&self) -> String {
        format!("--{}: {};", self.name, self.value)
    }
}
