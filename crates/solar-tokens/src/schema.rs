//! The declared allow-list of token sets.
//!
//! Top-level keys of a TokenStudio export are token sets, named either
//! `group` (`color`) or `group/variant` (`color/Light`, `brands/EVYDCore`).
//! A [`Schema`] declares, per group, whether its tokens are option or semantic
//! tokens, which output module they belong to, and whether the variant names a
//! theme or a brand. Unknown groups are an error: a misplaced set fails the run
//! rather than landing in the wrong bucket.
//!
//! # Paths
//!
//! - Plain keys are part of token paths: `{"color": {"neutral": ...}}` yields
//!   `color.neutral...`, always in the root context.
//! - For `group/variant` keys the variant only names the set; paths start
//!   inside it, so `color/Dark` and `color/Light` declare the same paths for
//!   different contexts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenError};
use crate::token::{Category, Context};

/// What the variant part of a `group/variant` set key selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    /// Variants are plain set names; tokens apply at the root.
    #[default]
    None,
    Theme,
    Brand,
}

/// Declaration for one token-set group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetRule {
    pub category: Category,
    /// Output module name (`colors`, `scale`, `brands`, ...).
    pub module: String,
    #[serde(default)]
    pub context: ContextKind,
}

impl SetRule {
    pub fn new(category: Category, module: impl Into<String>, context: ContextKind) -> Self {
        Self {
            category,
            module: module.into(),
            context,
        }
    }
}

/// Allow-list mapping set groups to their rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    rules: BTreeMap<String, SetRule>,
}

/// How one top-level set is read: its rule, context, and path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetBinding {
    pub key: String,
    pub rule: SetRule,
    pub context: Context,
    /// First path segment for plain keys; `None` for `group/variant` sets.
    pub prefix: Option<String>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::empty()
            .rule("color", SetRule::new(Category::Option, "colors", ContextKind::Theme))
            .rule("colors", SetRule::new(Category::Option, "colors", ContextKind::Theme))
            .rule("scale", SetRule::new(Category::Option, "scale", ContextKind::None))
            .rule("font", SetRule::new(Category::Option, "font", ContextKind::None))
            .rule("brands", SetRule::new(Category::Semantic, "brands", ContextKind::Brand))
            .rule("themes", SetRule::new(Category::Semantic, "themes", ContextKind::Theme))
            .rule("comp", SetRule::new(Category::Semantic, "components", ContextKind::None))
            .rule("semantic", SetRule::new(Category::Semantic, "semantic", ContextKind::None))
    }
}

impl Schema {
    /// A schema that allows nothing.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Adds or replaces the rule for `group`. Returns self for chaining.
    pub fn rule(mut self, group: impl Into<String>, rule: SetRule) -> Self {
        self.rules.insert(group.into(), rule);
        self
    }

    pub fn get(&self, group: &str) -> Option<&SetRule> {
        self.rules.get(group)
    }

    /// Allowed group names, sorted.
    pub fn allowed(&self) -> Vec<String> {
        self.rules.keys().cloned().collect()
    }

    /// Binds a top-level key to its rule and context.
    ///
    /// Returns `Ok(None)` for `$`-prefixed metadata keys (`$themes`,
    /// `$metadata`). A theme variant equal to `default_theme` binds to the
    /// root context.
    ///
    /// # Errors
    ///
    /// [`TokenError::UnknownTokenSet`] when the group is not declared, and
    /// [`TokenError::MalformedToken`] when a theme or brand variant does not
    /// normalize to a usable name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use solar_tokens::{Context, Schema};
    ///
    /// let schema = Schema::default();
    /// let dark = schema.bind("color/Dark (WIP)", "light").unwrap().unwrap();
    /// assert_eq!(dark.context, Context::theme("dark"));
    ///
    /// let light = schema.bind("color/Light", "light").unwrap().unwrap();
    /// assert!(light.context.is_root());
    ///
    /// assert!(schema.bind("$metadata", "light").unwrap().is_none());
    /// assert!(schema.bind("colours", "light").is_err());
    /// ```
    pub fn bind(&self, key: &str, default_theme: &str) -> Result<Option<SetBinding>> {
        if key.starts_with('$') {
            return Ok(None);
        }

        let (group, variant) = match key.split_once('/') {
            Some((group, variant)) => (group.trim(), Some(variant)),
            None => (key.trim(), None),
        };

        let rule = self
            .rules
            .get(group)
            .ok_or_else(|| TokenError::UnknownTokenSet {
                key: key.to_string(),
                allowed: self.allowed(),
            })?;

        let context = match (rule.context, variant) {
            (ContextKind::Theme, Some(variant)) => {
                let theme = context_name(key, variant)?;
                if theme == normalize_variant(default_theme) {
                    Context::root()
                } else {
                    Context::theme(theme)
                }
            }
            (ContextKind::Brand, Some(variant)) => Context::brand(context_name(key, variant)?),
            _ => Context::root(),
        };

        Ok(Some(SetBinding {
            key: key.to_string(),
            rule: rule.clone(),
            context,
            prefix: variant.is_none().then(|| group.to_string()),
        }))
    }
}

/// Normalizes a set variant into a theme or brand name.
///
/// Lowercases, drops parenthesised notes, and joins words with `-`:
/// `"Dark (WIP)"` becomes `"dark"`, `"High Contrast"` becomes `"high-contrast"`.
pub fn normalize_variant(variant: &str) -> String {
    let mut plain = String::with_capacity(variant.len());
    let mut depth = 0usize;
    for ch in variant.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 => plain.push(c),
            _ => {}
        }
    }
    plain
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalized variant, checked to be usable in an attribute selector.
fn context_name(key: &str, variant: &str) -> Result<String> {
    let name = normalize_variant(variant);
    let malformed = |message: String| TokenError::MalformedToken {
        location: key.to_string(),
        message,
    };

    if name.is_empty() {
        return Err(malformed(format!("set variant '{}' has an empty name", variant)));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(malformed(format!(
            "set variant '{}' contains '{}', which is not allowed in a theme or brand name",
            variant, bad
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_variant() {
        assert_eq!(normalize_variant("Dark (WIP)"), "dark");
        assert_eq!(normalize_variant("EVYDCore"), "evydcore");
        assert_eq!(normalize_variant("  High   Contrast "), "high-contrast");
    }

    #[test]
    fn test_plain_key_is_path_prefix() {
        let binding = Schema::default().bind("color", "light").unwrap().unwrap();
        assert_eq!(binding.prefix.as_deref(), Some("color"));
        assert!(binding.context.is_root());
        assert_eq!(binding.rule.category, Category::Option);
    }

    #[test]
    fn test_variant_key_has_no_prefix() {
        let binding = Schema::default()
            .bind("brands/EVYDCore", "light")
            .unwrap()
            .unwrap();
        assert_eq!(binding.prefix, None);
        assert_eq!(binding.context, Context::brand("evydcore"));
        assert_eq!(binding.rule.category, Category::Semantic);
        assert_eq!(binding.rule.module, "brands");
    }

    #[test]
    fn test_variant_of_contextless_group_is_root() {
        let binding = Schema::default()
            .bind("scale/option-token", "light")
            .unwrap()
            .unwrap();
        assert!(binding.context.is_root());
        assert_eq!(binding.prefix, None);
    }

    #[test]
    fn test_custom_default_theme() {
        let binding = Schema::default().bind("color/Dark", "dark").unwrap().unwrap();
        assert!(binding.context.is_root());
        let light = Schema::default().bind("color/Light", "dark").unwrap().unwrap();
        assert_eq!(light.context, Context::theme("light"));
    }

    #[test]
    fn test_empty_variant_name_fails() {
        let err = Schema::default().bind("color/(WIP)", "light").unwrap_err();
        match err {
            TokenError::MalformedToken { location, message } => {
                assert_eq!(location, "color/(WIP)");
                assert!(message.contains("empty name"));
            }
            other => panic!("Expected MalformedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_variant_with_selector_characters_fails() {
        let err = Schema::default().bind("brands/Acme\"Corp", "light").unwrap_err();
        assert!(matches!(err, TokenError::MalformedToken { .. }));
        assert!(Schema::default().bind("themes/Dark.v2", "light").is_err());
    }

    #[test]
    fn test_variant_of_contextless_group_is_not_checked() {
        assert!(Schema::default().bind("scale/(draft)", "light").is_ok());
    }

    #[test]
    fn test_unknown_group_fails() {
        let err = Schema::default().bind("palette/Light", "light").unwrap_err();
        match err {
            TokenError::UnknownTokenSet { key, allowed } => {
                assert_eq!(key, "palette/Light");
                assert!(allowed.contains(&"color".to_string()));
            }
            other => panic!("Expected UnknownTokenSet, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_from_yaml() {
        let schema: Schema = serde_yaml::from_str(
            r#"
palette:
  category: option
  module: colors
  context: theme
tokens:
  category: semantic
  module: semantic
"#,
        )
        .unwrap();
        assert_eq!(schema.allowed(), vec!["palette", "tokens"]);
        assert_eq!(schema.get("tokens").unwrap().context, ContextKind::None);
    }

    #[test]
    fn test_rule_with_misspelled_field_is_rejected() {
        let result: std::result::Result<Schema, _> = serde_yaml::from_str(
            r#"
palette:
  category: option
  module: colors
  contxt: theme
"#,
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("contxt"));
    }
}
