//! Per-module JSON files for the option and semantic buckets.

use serde::Serialize;

use super::Artifact;
use crate::error::{Result, TokenError};
use crate::extract::{Extraction, TokenModule};
use crate::token::{Category, Context, Token, TokenKind, TokenPath};

#[derive(Serialize)]
struct ModuleDocument<'a> {
    category: Category,
    module: &'a str,
    tokens: Vec<TokenRecord<'a>>,
}

#[derive(Serialize)]
struct TokenRecord<'a> {
    path: &'a TokenPath,
    name: String,
    #[serde(rename = "type")]
    kind: &'a TokenKind,
    /// Raw value as authored, references included.
    value: String,
    context: &'a Context,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a Token> for TokenRecord<'a> {
    fn from(token: &'a Token) -> Self {
        Self {
            path: &token.path,
            name: token.css_name(),
            kind: &token.kind,
            value: token.value.to_string(),
            context: &token.context,
            description: token.description.as_deref(),
        }
    }
}

/// Renders one module as pretty-printed JSON, tokens in traversal order.
pub fn render_module(module: &TokenModule) -> Result<String> {
    let document = ModuleDocument {
        category: module.category,
        module: &module.name,
        tokens: module.tokens.iter().map(TokenRecord::from).collect(),
    };
    let mut json = serde_json::to_string_pretty(&document).map_err(|e| TokenError::Render {
        artifact: format!("{}/{}.json", module.category.dir_name(), module.name),
        message: e.to_string(),
    })?;
    json.push('\n');
    Ok(json)
}

/// One artifact per module: `option-tokens/<module>.json` or
/// `semantic-tokens/<module>.json`.
pub fn module_artifacts(extraction: &Extraction) -> Result<Vec<Artifact>> {
    extraction
        .modules
        .iter()
        .map(|module| {
            let path = std::path::Path::new(module.category.dir_name())
                .join(format!("{}.json", module.name));
            Ok(Artifact::new(path, render_module(module)?))
        })
        .collect()
}
