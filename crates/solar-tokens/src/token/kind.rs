//! Token kinds derived from the TokenStudio `type` field.

use std::fmt;

use serde::{Serialize, Serializer};

/// Finer classification of a token, taken from its declared `type`.
///
/// TokenStudio uses several spellings for the same concept (`borderRadius`,
/// `fontSizes`, `sizing`, ...); they are folded into a handful of kinds.
/// Unknown types are kept verbatim in [`TokenKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Color,
    Spacing,
    Sizing,
    Radius,
    Typography,
    Dimension,
    Other(String),
}

impl TokenKind {
    pub fn from_type(token_type: &str) -> Self {
        match token_type.trim() {
            "color" => TokenKind::Color,
            "spacing" => TokenKind::Spacing,
            "sizing" | "size" => TokenKind::Sizing,
            "borderRadius" | "radius" => TokenKind::Radius,
            "typography" | "fontFamilies" | "fontFamily" | "fontWeights" | "fontWeight"
            | "fontSizes" | "fontSize" | "lineHeights" | "lineHeight" | "letterSpacing"
            | "paragraphSpacing" | "textCase" | "textDecoration" => TokenKind::Typography,
            "dimension" | "number" | "borderWidth" => TokenKind::Dimension,
            other => TokenKind::Other(other.to_string()),
        }
    }

    /// Canonical name, used as the key for per-kind sentinels in configuration.
    pub fn as_str(&self) -> &str {
        match self {
            TokenKind::Color => "color",
            TokenKind::Spacing => "spacing",
            TokenKind::Sizing => "sizing",
            TokenKind::Radius => "radius",
            TokenKind::Typography => "typography",
            TokenKind::Dimension => "dimension",
            TokenKind::Other(name) => name,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folds_tokens_studio_spellings() {
        assert_eq!(TokenKind::from_type("borderRadius"), TokenKind::Radius);
        assert_eq!(TokenKind::from_type("fontSizes"), TokenKind::Typography);
        assert_eq!(TokenKind::from_type("sizing"), TokenKind::Sizing);
        assert_eq!(TokenKind::from_type("color"), TokenKind::Color);
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let kind = TokenKind::from_type("boxShadow");
        assert_eq!(kind, TokenKind::Other("boxShadow".to_string()));
        assert_eq!(kind.as_str(), "boxShadow");
    }
}
