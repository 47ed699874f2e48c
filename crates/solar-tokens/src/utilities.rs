//! Tailwind-style utility classes derived from semantic color tokens.
//!
//! A semantic token qualifies when its variable name carries a role marker
//! after the first segment:
//!
//! | Marker   | Class prefix | Property           |
//! |----------|--------------|--------------------|
//! | `text`   | `text`       | `color`            |
//! | `fill`   | `bg`         | `background-color` |
//! | `stroke` | `border`     | `border-color`     |
//!
//! The trailing segment is the interaction state when it is one of `rest`,
//! `hover`, `press`, `focus`, `disabled`; otherwise the state is `rest`. The
//! segments in between form the base name. `rest` produces the bare class:
//!
//! ```text
//! --color-fill-brand-rest   -> .bg-brand       { background-color: var(--color-fill-brand-rest); }
//! --color-text-brand-hover  -> .text-brand-hover { color: var(--color-text-brand-hover); }
//! ```
//!
//! Rules reference variables rather than values, so one class set serves every
//! theme and brand.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::token::{Category, ResolvedToken};

/// Semantic role of a color token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Text,
    Fill,
    Stroke,
}

impl Role {
    pub fn from_marker(segment: &str) -> Option<Self> {
        match segment {
            "text" => Some(Role::Text),
            "fill" => Some(Role::Fill),
            "stroke" => Some(Role::Stroke),
            _ => None,
        }
    }

    pub fn class_prefix(&self) -> &'static str {
        match self {
            Role::Text => "text",
            Role::Fill => "bg",
            Role::Stroke => "border",
        }
    }

    pub fn property(&self) -> &'static str {
        match self {
            Role::Text => "color",
            Role::Fill => "background-color",
            Role::Stroke => "border-color",
        }
    }
}

/// Interaction state suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Rest,
    Hover,
    Press,
    Focus,
    Disabled,
}

impl State {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "rest" => Some(State::Rest),
            "hover" => Some(State::Hover),
            "press" => Some(State::Press),
            "focus" => Some(State::Focus),
            "disabled" => Some(State::Disabled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            State::Rest => "rest",
            State::Hover => "hover",
            State::Press => "press",
            State::Focus => "focus",
            State::Disabled => "disabled",
        }
    }
}

/// One generated utility class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityClassRule {
    /// Selector including the leading dot (`.bg-brand-hover`).
    pub class_name: String,
    pub property: String,
    /// Always a `var(--...)` reference.
    pub value: String,
}

impl UtilityClassRule {
    pub fn new(
        class_name: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            property: property.into(),
            value: value.into(),
        }
    }

    /// Derives the rule for a CSS variable name (without `--`), if it has one.
    ///
    /// ```rust
    /// use solar_tokens::UtilityClassRule;
    ///
    /// let rule = UtilityClassRule::from_variable("color-fill-brand-rest").unwrap();
    /// assert_eq!(rule.class_name, ".bg-brand");
    /// assert!(UtilityClassRule::from_variable("color-brand-primary").is_none());
    /// ```
    pub fn from_variable(name: &str) -> Option<Self> {
        let segments: Vec<&str> = name.split('-').filter(|s| !s.is_empty()).collect();
        let (marker, role) = segments
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(i, segment)| Role::from_marker(segment).map(|role| (i, role)))?;

        let rest = &segments[marker + 1..];
        let (base, state) = match rest.split_last() {
            Some((last, base)) => match State::from_segment(last) {
                Some(state) => (base, state),
                None => (rest, State::Rest),
            },
            None => (rest, State::Rest),
        };
        if base.is_empty() {
            return None;
        }

        let mut class_name = format!(".{}-{}", role.class_prefix(), base.join("-"));
        if state != State::Rest {
            class_name.push('-');
            class_name.push_str(state.as_str());
        }
        Some(Self::new(
            class_name,
            role.property(),
            format!("var(--{})", name),
        ))
    }
}

impl fmt::Display for UtilityClassRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {}: {}; }}", self.class_name, self.property, self.value)
    }
}

/// Which rule survives when two tokens produce the same class name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    #[default]
    KeepFirst,
    KeepLast,
}

/// A rule removed because its class name was already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedUtility {
    pub class_name: String,
    /// Value of the dropped rule.
    pub dropped: String,
    /// Value of the rule that was kept.
    pub kept: String,
}

/// Minimal known-good classes used when no token yields a utility.
pub const FALLBACK_UTILITIES: &[(&str, &str, &str)] = &[
    (".text-primary", "color", "var(--color-text-primary-rest)"),
    (".text-secondary", "color", "var(--color-text-secondary-rest)"),
    (".bg-primary", "background-color", "var(--color-fill-primary-rest)"),
    (".bg-brand", "background-color", "var(--color-fill-brand-rest)"),
    (".border-primary", "border-color", "var(--color-stroke-primary-rest)"),
];

/// Generated utility classes, sorted by class name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtilitySet {
    rules: Vec<UtilityClassRule>,
    used_fallback: bool,
    dropped: Vec<DroppedUtility>,
}

impl UtilitySet {
    /// The fixed fallback set.
    pub fn fallback() -> Self {
        let mut rules: Vec<UtilityClassRule> = FALLBACK_UTILITIES
            .iter()
            .map(|(class_name, property, value)| UtilityClassRule::new(*class_name, *property, *value))
            .collect();
        rules.sort_by(|a, b| a.class_name.cmp(&b.class_name));
        Self {
            rules,
            used_fallback: true,
            dropped: Vec::new(),
        }
    }

    pub fn rules(&self) -> &[UtilityClassRule] {
        &self.rules
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    pub fn dropped(&self) -> &[DroppedUtility] {
        &self.dropped
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Plain CSS stylesheet, one rule per line.
    pub fn to_css(&self) -> String {
        let mut out = String::from("/* Generated by solar-tokens. Do not edit by hand. */\n\n");
        for rule in &self.rules {
            out.push_str(&rule.to_string());
            out.push('\n');
        }
        out
    }

    /// A Tailwind plugin module registering every rule via `addUtilities`.
    pub fn to_tailwind_plugin(&self) -> String {
        let mut out = String::from(
            "// Generated by solar-tokens. Do not edit by hand.\n\
             const plugin = require('tailwindcss/plugin');\n\
             \n\
             module.exports = plugin(function ({ addUtilities }) {\n  addUtilities({\n",
        );
        for rule in &self.rules {
            out.push_str(&format!(
                "    '{}': {{ '{}': '{}' }},\n",
                rule.class_name, rule.property, rule.value
            ));
        }
        out.push_str("  });\n});\n");
        out
    }
}

/// Serializes as an object keyed by selector, the shape `addUtilities` takes.
impl Serialize for UtilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for rule in &self.rules {
            let mut declaration = HashMap::with_capacity(1);
            declaration.insert(rule.property.as_str(), rule.value.as_str());
            map.serialize_entry(&rule.class_name, &declaration)?;
        }
        map.end()
    }
}

/// Builds utility classes from resolved tokens.
///
/// Only semantic tokens are considered, and each variable name is used once
/// even though it may be declared in several contexts. Class-name collisions
/// are settled by `policy` and reported in [`UtilitySet::dropped`]. When
/// nothing qualifies the [fallback set](FALLBACK_UTILITIES) is returned.
pub fn generate_utilities<'a, I>(tokens: I, policy: DuplicatePolicy) -> UtilitySet
where
    I: IntoIterator<Item = &'a ResolvedToken>,
{
    let mut variables = HashSet::new();
    let mut rules: Vec<UtilityClassRule> = Vec::new();
    let mut by_class: HashMap<String, usize> = HashMap::new();
    let mut dropped = Vec::new();

    for token in tokens {
        if token.category != Category::Semantic || !variables.insert(token.name.as_str()) {
            continue;
        }
        let Some(rule) = UtilityClassRule::from_variable(&token.name) else {
            continue;
        };

        match by_class.get(&rule.class_name) {
            None => {
                by_class.insert(rule.class_name.clone(), rules.len());
                rules.push(rule);
            }
            Some(&index) => {
                let existing = &mut rules[index];
                debug!(
                    class = %rule.class_name,
                    first = %existing.value,
                    second = %rule.value,
                    "duplicate utility class"
                );
                let (kept, lost) = match policy {
                    DuplicatePolicy::KeepFirst => (existing.value.clone(), rule.value),
                    DuplicatePolicy::KeepLast => {
                        let lost = std::mem::replace(existing, rule);
                        (existing.value.clone(), lost.value)
                    }
                };
                dropped.push(DroppedUtility {
                    class_name: existing.class_name.clone(),
                    dropped: lost,
                    kept,
                });
            }
        }
    }

    if rules.is_empty() {
        return UtilitySet::fallback();
    }

    rules.sort_by(|a, b| a.class_name.cmp(&b.class_name));
    UtilitySet {
        rules,
        used_fallback: false,
        dropped,
    }
}
