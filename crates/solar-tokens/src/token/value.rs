//! Token values: literals and references to other tokens.

use std::fmt;

use super::path::TokenPath;

/// A raw token value, classified once when the token file is loaded.
///
/// This enables layered tokens where semantic tokens reference option tokens,
/// which carry the concrete values.
///
/// # Example
///
/// ```rust
/// use solar_tokens::{TokenPath, TokenValue};
///
/// assert_eq!(TokenValue::parse("#1A73E8"), TokenValue::Literal("#1A73E8".into()));
/// assert_eq!(
///     TokenValue::parse("{color.brand.primary.hover}"),
///     TokenValue::Alias(TokenPath::new(["color", "brand", "primary", "hover"])),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    /// A concrete value (hex color, number, font name, ...).
    Literal(String),
    /// The whole value references another token.
    Alias(TokenPath),
    /// A literal with embedded references, e.g. `rgba({color.black}, 0.5)`.
    Interpolated(Vec<ValuePart>),
}

/// One piece of an [`TokenValue::Interpolated`] value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuePart {
    Text(String),
    Ref(TokenPath),
}

impl TokenValue {
    /// Classifies a raw string value.
    ///
    /// A value that is exactly `{dotted.path}` becomes an alias. Braces around
    /// something that is not a valid path stay literal text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some(inner) = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            if !inner.contains(['{', '}']) && !inner.trim().contains(char::is_whitespace) {
                if let Some(path) = TokenPath::parse(inner) {
                    return TokenValue::Alias(path);
                }
            }
        }

        let parts = split_references(trimmed);
        if parts.iter().any(|p| matches!(p, ValuePart::Ref(_))) {
            TokenValue::Interpolated(parts)
        } else {
            TokenValue::Literal(trimmed.to_string())
        }
    }

    /// Returns every token path this value refers to, in order.
    pub fn references(&self) -> Vec<&TokenPath> {
        match self {
            TokenValue::Literal(_) => Vec::new(),
            TokenValue::Alias(path) => vec![path],
            TokenValue::Interpolated(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ValuePart::Ref(path) => Some(path),
                    ValuePart::Text(_) => None,
                })
                .collect(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, TokenValue::Literal(_))
    }
}

fn split_references(raw: &str) -> Vec<ValuePart> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut rest = raw;

    while let Some(open) = rest.find('{') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            break;
        };
        let inner = &after_open[..close];
        match TokenPath::parse(inner) {
            Some(path) if !inner.contains('{') && !inner.contains(char::is_whitespace) => {
                text.push_str(&rest[..open]);
                if !text.is_empty() {
                    parts.push(ValuePart::Text(std::mem::take(&mut text)));
                }
                parts.push(ValuePart::Ref(path));
            }
            _ => text.push_str(&rest[..open + 1 + close + 1]),
        }
        rest = &after_open[close + 1..];
    }

    text.push_str(rest);
    if !text.is_empty() {
        parts.push(ValuePart::Text(text));
    }
    parts
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Literal(value) => write!(f, "{}", value),
            TokenValue::Alias(path) => write!(f, "{{{}}}", path),
            TokenValue::Interpolated(parts) => {
                for part in parts {
                    match part {
                        ValuePart::Text(text) => write!(f, "{}", text)?,
                        ValuePart::Ref(path) => write!(f, "{{{}}}", path)?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for TokenValue {
    fn from(raw: &str) -> Self {
        TokenValue::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_hex() {
        assert_eq!(
            TokenValue::parse("#1A73E8"),
            TokenValue::Literal("#1A73E8".to_string())
        );
    }

    #[test]
    fn test_alias() {
        match TokenValue::parse("{color.brand.primary.hover}") {
            TokenValue::Alias(path) => assert_eq!(path.to_string(), "color.brand.primary.hover"),
            other => panic!("Expected Alias, got {:?}", other),
        }
    }

    #[test]
    fn test_alias_with_surrounding_whitespace() {
        assert!(matches!(
            TokenValue::parse("  {color.neutral.100} "),
            TokenValue::Alias(_)
        ));
    }

    #[test]
    fn test_empty_braces_stay_literal() {
        assert_eq!(TokenValue::parse("{}"), TokenValue::Literal("{}".to_string()));
    }

    #[test]
    fn test_interpolated() {
        let value = TokenValue::parse("rgba({color.black}, 0.5)");
        match &value {
            TokenValue::Interpolated(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], ValuePart::Text("rgba(".to_string()));
                assert_eq!(parts[1], ValuePart::Ref(TokenPath::new(["color", "black"])));
                assert_eq!(parts[2], ValuePart::Text(", 0.5)".to_string()));
            }
            other => panic!("Expected Interpolated, got {:?}", other),
        }
        assert_eq!(value.to_string(), "rgba({color.black}, 0.5)");
    }

    #[test]
    fn test_two_adjacent_references() {
        let value = TokenValue::parse("{space.x} {space.y}");
        assert_eq!(value.references().len(), 2);
    }

    #[test]
    fn test_brace_text_without_path_is_literal() {
        let value = TokenValue::parse("calc({ 2 * 4 })");
        assert!(value.is_literal());
        assert_eq!(value.to_string(), "calc({ 2 * 4 })");
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        assert!(TokenValue::parse("{color.black").is_literal());
    }

    #[test]
    fn test_references_of_literal_are_empty() {
        assert!(TokenValue::parse("16px").references().is_empty());
    }
}
