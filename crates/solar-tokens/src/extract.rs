//! Token extraction: walking the source tree into categorized modules.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::{Result, TokenError};
use crate::schema::{Schema, SetBinding};
use crate::source::{Node, TokenSource};
use crate::token::{Category, Token, TokenKind, TokenPath, TokenValue};

/// Tokens of one output module, in source traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenModule {
    pub category: Category,
    pub name: String,
    pub tokens: Vec<Token>,
}

/// A leaf that was not turned into a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedToken {
    pub set: String,
    pub path: TokenPath,
    pub reason: String,
}

/// Output of [`extract`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Modules in order of first appearance.
    pub modules: Vec<TokenModule>,
    pub skipped: Vec<SkippedToken>,
}

impl Extraction {
    /// Modules belonging to one bucket.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &TokenModule> {
        self.modules.iter().filter(move |m| m.category == category)
    }

    /// Every token, module by module.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.modules.iter().flat_map(|m| m.tokens.iter())
    }

    pub fn token_count(&self) -> usize {
        self.modules.iter().map(|m| m.tokens.len()).sum()
    }

    fn module_mut(&mut self, category: Category, name: &str) -> &mut TokenModule {
        let index = match self
            .modules
            .iter()
            .position(|m| m.category == category && m.name == name)
        {
            Some(index) => index,
            None => {
                self.modules.push(TokenModule {
                    category,
                    name: name.to_string(),
                    tokens: Vec::new(),
                });
                self.modules.len() - 1
            }
        };
        &mut self.modules[index]
    }
}

/// Walks every declared token set and sorts its leaves into modules.
///
/// Classification comes from the set's [`Schema`] rule, never from the value.
/// Extraction is all-or-nothing: the first structural problem aborts it.
///
/// # Errors
///
/// - [`TokenError::UnknownTokenSet`] for a set the schema does not declare
/// - [`TokenError::DuplicatePath`] / [`TokenError::NameCollision`] within a set
/// - [`TokenError::MalformedToken`] for leaves without a type, or non-object groups
pub fn extract(source: &TokenSource, schema: &Schema, default_theme: &str) -> Result<Extraction> {
    let mut extraction = Extraction::default();

    for (key, node) in source.sets() {
        let Some(binding) = schema.bind(key, default_theme)? else {
            debug!(key = %key, "skipping metadata entry");
            continue;
        };

        let Node::Object(entries) = node else {
            return Err(TokenError::MalformedToken {
                location: key.clone(),
                message: format!("token set must be an object, found {}", node.type_name()),
            });
        };

        let mut walker = SetWalker {
            binding: &binding,
            paths: HashSet::new(),
            names: HashMap::new(),
            tokens: Vec::new(),
            skipped: Vec::new(),
        };
        let root = TokenPath::new(binding.prefix.iter().cloned());
        walker.walk(entries, &root)?;

        debug!(
            set = %key,
            context = %binding.context,
            tokens = walker.tokens.len(),
            "extracted token set"
        );

        let SetWalker { tokens, skipped, .. } = walker;
        extraction.skipped.extend(skipped);
        extraction
            .module_mut(binding.rule.category, &binding.rule.module)
            .tokens
            .extend(tokens);
    }

    info!(
        tokens = extraction.token_count(),
        modules = extraction.modules.len(),
        "extracted tokens"
    );
    Ok(extraction)
}

struct SetWalker<'a> {
    binding: &'a SetBinding,
    paths: HashSet<TokenPath>,
    names: HashMap<String, TokenPath>,
    tokens: Vec<Token>,
    skipped: Vec<SkippedToken>,
}

impl SetWalker<'_> {
    fn walk(&mut self, entries: &[(String, Node)], prefix: &TokenPath) -> Result<()> {
        for (key, node) in entries {
            if key.starts_with('$') {
                continue;
            }
            let path = key
                .split('.')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .fold(prefix.clone(), |path, segment| path.child(segment));
            match node {
                Node::Object(_) if is_leaf(node) => self.leaf(node, path)?,
                Node::Object(children) => self.walk(children, &path)?,
                other => {
                    return Err(self.malformed(
                        &path,
                        format!("expected a token or group, found {}", other.type_name()),
                    ))
                }
            }
        }
        Ok(())
    }

    fn leaf(&mut self, node: &Node, path: TokenPath) -> Result<()> {
        if path.is_empty() {
            return Err(self.malformed(&path, "token has an empty path".to_string()));
        }
        let token_type = field(node, "type")
            .ok_or_else(|| self.malformed(&path, "token has a value but no type".to_string()))?
            .as_str()
            .ok_or_else(|| self.malformed(&path, "token type must be a string".to_string()))?;

        let value = match field(node, "value") {
            Some(Node::String(raw)) => TokenValue::parse(raw),
            Some(Node::Number(text)) => TokenValue::Literal(text.clone()),
            Some(Node::Bool(flag)) => TokenValue::Literal(flag.to_string()),
            Some(composite @ (Node::Object(_) | Node::Array(_))) => {
                self.skipped.push(SkippedToken {
                    set: self.binding.key.clone(),
                    path,
                    reason: format!("composite {} value", composite.type_name()),
                });
                return Ok(());
            }
            Some(Node::Null) | None => {
                return Err(self.malformed(&path, "token value is null".to_string()))
            }
        };

        if !self.paths.insert(path.clone()) {
            return Err(TokenError::DuplicatePath {
                set: self.binding.key.clone(),
                path,
            });
        }

        let name = path.css_name();
        if let Some(first) = self.names.get(&name) {
            return Err(TokenError::NameCollision {
                set: self.binding.key.clone(),
                name,
                first: first.clone(),
                second: path,
            });
        }
        self.names.insert(name, path.clone());

        self.tokens.push(Token {
            path,
            value,
            category: self.binding.rule.category,
            kind: TokenKind::from_type(token_type),
            module: self.binding.rule.module.clone(),
            context: self.binding.context.clone(),
            description: field(node, "description")
                .and_then(Node::as_str)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        });
        Ok(())
    }

    fn malformed(&self, path: &TokenPath, message: String) -> TokenError {
        TokenError::MalformedToken {
            location: format!("{}:{}", self.binding.key, path),
            message,
        }
    }
}

/// A leaf carries `value` (TokenStudio) or `$value` (W3C design tokens).
fn is_leaf(node: &Node) -> bool {
    field(node, "value").is_some()
}

fn field<'n>(node: &'n Node, name: &str) -> Option<&'n Node> {
    node.get(name).or_else(|| node.get(&format!("${}", name)))
}
