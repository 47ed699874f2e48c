//! Rendering resolved and extracted tokens into output artifacts.
//!
//! Rendering is pure: every function here returns text, and the pipeline
//! decides when and where to write it. Output is byte-stable for a given
//! input (sorted declarations, no timestamps).

mod css;
mod modules;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::token::Context;

pub use css::emit_css;
pub use modules::{module_artifacts, render_module};

/// A rendered file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Attribute names used to select theme and brand contexts.
///
/// The consuming UI sets these on the document root; the pipeline only emits
/// selectors for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub theme_attribute: String,
    pub brand_attribute: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            theme_attribute: "data-theme".to_string(),
            brand_attribute: "data-brand".to_string(),
        }
    }
}

impl SelectorConfig {
    /// CSS selector for a context.
    ///
    /// ```rust
    /// use solar_tokens::{Context, SelectorConfig};
    ///
    /// let selectors = SelectorConfig::default();
    /// assert_eq!(selectors.selector(&Context::root()), ":root");
    /// assert_eq!(
    ///     selectors.selector(&Context::combined("dark", "acme")),
    ///     r#":root[data-theme="dark"][data-brand="acme"]"#
    /// );
    /// ```
    pub fn selector(&self, context: &Context) -> String {
        let mut selector = String::from(":root");
        if let Some(theme) = &context.theme {
            selector.push_str(&format!("[{}=\"{}\"]", self.theme_attribute, theme));
        }
        if let Some(brand) = &context.brand {
            selector.push_str(&format!("[{}=\"{}\"]", self.brand_attribute, brand));
        }
        selector
    }
}
