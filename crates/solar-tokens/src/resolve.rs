//! Alias resolution: following token references to literal values.
//!
//! Resolution runs once per [`Context`]. Each context sees a scope made of
//! layers, most specific first:
//!
//! | Context        | Scope                          |
//! |----------------|--------------------------------|
//! | root           | root                           |
//! | theme          | theme, root                    |
//! | brand          | brand, root                    |
//! | theme + brand  | theme+brand, brand, theme, root |
//!
//! A reference is looked up in the scope and resolved recursively. Results are
//! memoised per scope, so the outcome does not depend on the order tokens are
//! visited in.
//!
//! # Failure handling
//!
//! - A reference to a path that does not exist resolves to a sentinel value
//!   (see [`Sentinels`]) and is recorded as a [`Fallback`].
//! - A chain that revisits a path still being resolved is a cycle. Every
//!   distinct cycle is collected and the run fails with
//!   [`TokenError::CircularReference`].
//!
//! # Emission
//!
//! The root context emits every root token. Other contexts emit the tokens
//! they declare plus any token whose value changes under their overlay, so an
//! alias to a themed color follows the theme even though the alias itself is
//! declared at the root. Theme+brand combinations emit only what the cascade
//! of the theme and brand blocks would otherwise get wrong.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CycleError, Result, TokenError};
use crate::extract::Extraction;
use crate::token::{Context, ResolvedToken, Token, TokenKind, TokenPath, TokenValue, ValuePart};

/// Value substituted for references that cannot be resolved.
///
/// Deliberately visible: a flat grey in the UI points at a broken token.
pub const DEFAULT_SENTINEL: &str = "#CCCCCC";

/// Sentinel values for unresolvable references, optionally per token kind.
///
/// # Example
///
/// ```rust
/// use solar_tokens::{Sentinels, TokenKind};
///
/// let sentinels = Sentinels::default().with_kind("spacing", "8px");
/// assert_eq!(sentinels.for_kind(&TokenKind::Spacing), "8px");
/// assert_eq!(sentinels.for_kind(&TokenKind::Color), "#CCCCCC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentinels {
    pub default: String,
    pub by_kind: BTreeMap<String, String>,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            default: DEFAULT_SENTINEL.to_string(),
            by_kind: BTreeMap::new(),
        }
    }
}

impl Sentinels {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            by_kind: BTreeMap::new(),
        }
    }

    /// Sets the sentinel for one kind. Returns self for chaining.
    pub fn with_kind(mut self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        self.by_kind.insert(kind.into(), value.into());
        self
    }

    pub fn for_kind(&self, kind: &TokenKind) -> &str {
        self.by_kind
            .get(kind.as_str())
            .map(String::as_str)
            .unwrap_or(&self.default)
    }
}

/// A token that fell back to a sentinel because a reference was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub token: TokenPath,
    pub context: Context,
    /// The reference that could not be found.
    pub missing: TokenPath,
    /// The value the token was emitted with.
    pub value: String,
}

/// Output of [`resolve`]: alias-free tokens for every context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    tokens: Vec<ResolvedToken>,
    fallbacks: Vec<Fallback>,
}

impl Resolution {
    /// Every resolved token, ordered by context then name.
    pub fn tokens(&self) -> &[ResolvedToken] {
        &self.tokens
    }

    /// Distinct contexts, in emission order.
    pub fn contexts(&self) -> Vec<&Context> {
        let mut contexts: Vec<&Context> = Vec::new();
        for token in &self.tokens {
            if contexts.last() != Some(&&token.context) {
                contexts.push(&token.context);
            }
        }
        contexts
    }

    pub fn in_context<'a>(
        &'a self,
        context: &'a Context,
    ) -> impl Iterator<Item = &'a ResolvedToken> + 'a {
        self.tokens.iter().filter(move |t| &t.context == context)
    }

    /// Looks up a token by CSS variable name within a context.
    pub fn get(&self, name: &str, context: &Context) -> Option<&ResolvedToken> {
        self.tokens
            .iter()
            .find(|t| t.name == name && &t.context == context)
    }

    pub fn fallbacks(&self) -> &[Fallback] {
        &self.fallbacks
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Resolves every token of `extraction` in every context.
///
/// # Errors
///
/// - [`TokenError::CircularReference`] listing each distinct cycle
/// - [`TokenError::NameCollision`] when two paths visible in one context
///   produce the same CSS variable name
pub fn resolve(extraction: &Extraction, sentinels: &Sentinels) -> Result<Resolution> {
    let layers = build_layers(extraction);
    let contexts = contexts_to_emit(&layers);

    let mut values: BTreeMap<Context, BTreeMap<&TokenPath, (Outcome, &Token)>> = BTreeMap::new();
    let mut cycles: Vec<CycleError> = Vec::new();
    let mut seen_cycles = HashSet::new();

    for context in &contexts {
        let scope = Scope::new(
            scope_chain(context)
                .iter()
                .filter_map(|c| layers.get(c))
                .collect(),
        );
        let mut resolver = Resolver::new(&scope, sentinels);
        let mut resolved = BTreeMap::new();

        for (path, token) in scope.entries() {
            match resolver.resolve(path, token) {
                Ok(outcome) => {
                    resolved.insert(path, (outcome, token));
                }
                Err(cycle) => {
                    let cycle = cycle.normalized();
                    if seen_cycles.insert(cycle.clone()) {
                        cycles.push(cycle);
                    }
                }
            }
        }
        values.insert(context.clone(), resolved);
    }

    if !cycles.is_empty() {
        cycles.sort_by(|a, b| a.chain.cmp(&b.chain));
        return Err(TokenError::CircularReference { cycles });
    }

    let mut emitted: HashMap<Context, HashMap<&TokenPath, String>> = HashMap::new();
    let mut resolution = Resolution::default();

    for (context, resolved) in &values {
        let declared = layers.get(context);
        let mut block = HashMap::new();
        let mut names: HashMap<String, &TokenPath> = HashMap::new();

        for (path, (outcome, token)) in resolved {
            // Every visible path takes part, including inherited ones that
            // are not redeclared in this block.
            let name = path.css_name();
            if let Some(first) = names.insert(name.clone(), *path) {
                return Err(TokenError::NameCollision {
                    set: format!("context {}", context),
                    name,
                    first: first.clone(),
                    second: (*path).clone(),
                });
            }

            if !context.is_root() {
                let declared_here = declared.is_some_and(|layer| layer.contains_key(path));
                let inherited = inherited_value(context, path, &emitted);
                if !declared_here && inherited == Some(&outcome.value) {
                    continue;
                }
            }

            for missing in outcome.missing.iter().collect::<BTreeSet<_>>() {
                debug!(
                    token = %path,
                    context = %context,
                    missing = %missing,
                    "unresolved reference, using sentinel"
                );
                resolution.fallbacks.push(Fallback {
                    token: (*path).clone(),
                    context: context.clone(),
                    missing: missing.clone(),
                    value: outcome.value.clone(),
                });
            }

            block.insert(*path, outcome.value.clone());
            resolution.tokens.push(ResolvedToken {
                name,
                value: outcome.value.clone(),
                path: (*path).clone(),
                category: token.category,
                kind: token.kind.clone(),
                context: context.clone(),
            });
        }
        emitted.insert(context.clone(), block);
    }

    resolution
        .tokens
        .sort_by(|a, b| a.context.cmp(&b.context).then_with(|| a.name.cmp(&b.name)));

    info!(
        tokens = resolution.tokens.len(),
        contexts = contexts.len(),
        fallbacks = resolution.fallbacks.len(),
        "resolved tokens"
    );
    Ok(resolution)
}

type Layer<'a> = HashMap<&'a TokenPath, &'a Token>;

fn build_layers(extraction: &Extraction) -> BTreeMap<Context, Layer<'_>> {
    let mut layers: BTreeMap<Context, Layer<'_>> = BTreeMap::new();
    for token in extraction.tokens() {
        let layer = layers.entry(token.context.clone()).or_default();
        if let Some(previous) = layer.insert(&token.path, token) {
            debug!(
                token = %token.path,
                context = %token.context,
                from = %previous.module,
                to = %token.module,
                "later token set overrides earlier definition"
            );
        }
    }
    layers
}

fn contexts_to_emit(layers: &BTreeMap<Context, Layer<'_>>) -> BTreeSet<Context> {
    let mut contexts: BTreeSet<Context> = layers.keys().cloned().collect();
    contexts.insert(Context::root());

    let themes: Vec<&String> = layers.keys().filter_map(|c| c.theme.as_ref()).collect();
    let brands: Vec<&String> = layers.keys().filter_map(|c| c.brand.as_ref()).collect();
    for theme in &themes {
        for brand in &brands {
            contexts.insert(Context::combined(theme.as_str(), brand.as_str()));
        }
    }
    contexts
}

/// Contexts whose layers are visible from `context`, most specific first.
fn scope_chain(context: &Context) -> Vec<Context> {
    let mut chain = vec![context.clone()];
    if let (Some(theme), Some(brand)) = (&context.theme, &context.brand) {
        chain.push(Context::brand(brand.as_str()));
        chain.push(Context::theme(theme.as_str()));
    }
    if !context.is_root() {
        chain.push(Context::root());
    }
    chain
}

/// The value a context would get from the blocks emitted before it.
fn inherited_value<'e>(
    context: &Context,
    path: &TokenPath,
    emitted: &'e HashMap<Context, HashMap<&TokenPath, String>>,
) -> Option<&'e String> {
    scope_chain(context)
        .iter()
        .skip(1)
        .find_map(|c| emitted.get(c)?.get(path))
}

struct Scope<'a> {
    layers: Vec<&'a Layer<'a>>,
}

impl<'a> Scope<'a> {
    fn new(layers: Vec<&'a Layer<'a>>) -> Self {
        Self { layers }
    }

    fn get(&self, path: &TokenPath) -> Option<&'a Token> {
        self.layers.iter().find_map(|layer| layer.get(path).copied())
    }

    /// Every visible path with its winning token, sorted by path.
    fn entries(&self) -> BTreeMap<&'a TokenPath, &'a Token> {
        let mut entries = BTreeMap::new();
        for layer in self.layers.iter().rev() {
            for (path, token) in layer.iter() {
                entries.insert(*path, *token);
            }
        }
        entries
    }
}

#[derive(Debug, Clone)]
struct Outcome {
    value: String,
    missing: Vec<TokenPath>,
}

struct Resolver<'s, 'a> {
    scope: &'s Scope<'a>,
    sentinels: &'s Sentinels,
    memo: HashMap<TokenPath, Outcome>,
    failed: HashMap<TokenPath, CycleError>,
}

impl<'s, 'a> Resolver<'s, 'a> {
    fn new(scope: &'s Scope<'a>, sentinels: &'s Sentinels) -> Self {
        Self {
            scope,
            sentinels,
            memo: HashMap::new(),
            failed: HashMap::new(),
        }
    }

    fn resolve(
        &mut self,
        path: &TokenPath,
        token: &Token,
    ) -> std::result::Result<Outcome, CycleError> {
        let mut stack = Vec::new();
        self.visit(path, token, &mut stack)
    }

    fn visit(
        &mut self,
        path: &TokenPath,
        token: &Token,
        stack: &mut Vec<TokenPath>,
    ) -> std::result::Result<Outcome, CycleError> {
        if let Some(done) = self.memo.get(path) {
            return Ok(done.clone());
        }
        if let Some(cycle) = self.failed.get(path) {
            return Err(cycle.clone());
        }
        if let Some(start) = stack.iter().position(|p| p == path) {
            let mut chain = stack[start..].to_vec();
            chain.push(path.clone());
            return Err(CycleError { chain });
        }

        stack.push(path.clone());
        let result = self.evaluate(token, stack);
        stack.pop();

        match &result {
            Ok(outcome) => {
                self.memo.insert(path.clone(), outcome.clone());
            }
            Err(cycle) => {
                self.failed.insert(path.clone(), cycle.clone());
            }
        }
        result
    }

    fn evaluate(
        &mut self,
        token: &Token,
        stack: &mut Vec<TokenPath>,
    ) -> std::result::Result<Outcome, CycleError> {
        match &token.value {
            TokenValue::Literal(value) => Ok(Outcome {
                value: value.clone(),
                missing: Vec::new(),
            }),
            TokenValue::Alias(target) => self.reference(token, target, stack),
            TokenValue::Interpolated(parts) => {
                let mut value = String::new();
                let mut missing = Vec::new();
                for part in parts {
                    match part {
                        ValuePart::Text(text) => value.push_str(text),
                        ValuePart::Ref(target) => {
                            let outcome = self.reference(token, target, stack)?;
                            value.push_str(&outcome.value);
                            missing.extend(outcome.missing);
                        }
                    }
                }
                Ok(Outcome { value, missing })
            }
        }
    }

    fn reference(
        &mut self,
        token: &Token,
        target: &TokenPath,
        stack: &mut Vec<TokenPath>,
    ) -> std::result::Result<Outcome, CycleError> {
        match self.scope.get(target) {
            Some(referenced) => self.visit(target, referenced, stack),
            None => Ok(Outcome {
                value: self.sentinels.for_kind(&token.kind).to_string(),
                missing: vec![target.clone()],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TokenModule;
    use crate::token::Category;

    fn token(path: &str, value: &str, category: Category, context: Context) -> Token {
        Token {
            path: TokenPath::parse(path).unwrap(),
            value: TokenValue::parse(value),
            category,
            kind: TokenKind::Color,
            module: "test".to_string(),
            context,
            description: None,
        }
    }

    fn root(path: &str, value: &str) -> Token {
        token(path, value, Category::Option, Context::root())
    }

    fn extraction(tokens: Vec<Token>) -> Extraction {
        Extraction {
            modules: vec![TokenModule {
                category: Category::Option,
                name: "test".to_string(),
                tokens,
            }],
            skipped: Vec::new(),
        }
    }

    fn value<'r>(resolution: &'r Resolution, name: &str, context: &Context) -> &'r str {
        &resolution
            .get(name, context)
            .unwrap_or_else(|| panic!("missing {} in {}", name, context))
            .value
    }

    #[test]
    fn test_literal_passes_through() {
        let resolution = resolve(
            &extraction(vec![root("color.brand.primary.rest", "#1A73E8")]),
            &Sentinels::default(),
        )
        .unwrap();
        let token = &resolution.tokens()[0];
        assert_eq!(token.name, "color-brand-primary-rest");
        assert_eq!(token.value, "#1A73E8");
        assert_eq!(
            token.declaration(),
            "--color-brand-primary-rest: #1A73E8;"
        );
    }

    #[test]
    fn test_single_alias() {
        let resolution = resolve(
            &extraction(vec![
                root("color.text.primary.hover", "{color.brand.primary.hover}"),
                root("color.brand.primary.hover", "#1558B0"),
            ]),
            &Sentinels::default(),
        )
        .unwrap();
        assert_eq!(
            value(&resolution, "color-text-primary-hover", &Context::root()),
            "#1558B0"
        );
    }

    #[test]
    fn test_deep_alias_chain() {
        let resolution = resolve(
            &extraction(vec![
                root("level4", "{level3}"),
                root("level3", "{level2}"),
                root("level2", "{level1}"),
                root("level1", "{level0}"),
                root("level0", "#000"),
            ]),
            &Sentinels::default(),
        )
        .unwrap();
        for name in ["level0", "level1", "level2", "level3", "level4"] {
            assert_eq!(value(&resolution, name, &Context::root()), "#000");
        }
    }

    #[test]
    fn test_interpolated_references() {
        let resolution = resolve(
            &extraction(vec![
                root("shadow.color", "rgba({color.black}, {opacity.half})"),
                root("color.black", "0, 0, 0"),
                root("opacity.half", "0.5"),
            ]),
            &Sentinels::default(),
        )
        .unwrap();
        assert_eq!(
            value(&resolution, "shadow-color", &Context::root()),
            "rgba(0, 0, 0, 0.5)"
        );
    }

    #[test]
    fn test_two_cycle_detected() {
        let err = resolve(
            &extraction(vec![root("a", "{b}"), root("b", "{a}")]),
            &Sentinels::default(),
        )
        .unwrap_err();
        match err {
            TokenError::CircularReference { cycles } => {
                assert_eq!(cycles.len(), 1);
                assert_eq!(cycles[0].to_string(), "a -> b -> a");
            }
            other => panic!("Expected CircularReference, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_detected() {
        let err = resolve(
            &extraction(vec![root("self", "{self}")]),
            &Sentinels::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("self -> self"));
    }

    #[test]
    fn test_three_way_cycle_with_dependent() {
        let err = resolve(
            &extraction(vec![
                root("entry", "{a}"),
                root("a", "{b}"),
                root("b", "{c}"),
                root("c", "{a}"),
            ]),
            &Sentinels::default(),
        )
        .unwrap_err();
        match err {
            TokenError::CircularReference { cycles } => {
                assert_eq!(cycles.len(), 1);
                assert_eq!(cycles[0].to_string(), "a -> b -> c -> a");
            }
            other => panic!("Expected CircularReference, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_reference_uses_sentinel() {
        let resolution = resolve(
            &extraction(vec![root("orphan", "{color.nowhere}"), root("ok", "#fff")]),
            &Sentinels::default(),
        )
        .unwrap();
        assert_eq!(value(&resolution, "orphan", &Context::root()), DEFAULT_SENTINEL);
        assert_eq!(resolution.fallbacks().len(), 1);
        let fallback = &resolution.fallbacks()[0];
        assert_eq!(fallback.token.to_string(), "orphan");
        assert_eq!(fallback.missing.to_string(), "color.nowhere");
    }

    #[test]
    fn test_missing_reference_in_chain_counts_each_token() {
        let resolution = resolve(
            &extraction(vec![root("a", "{b}"), root("b", "{missing}")]),
            &Sentinels::new("#FF00FF"),
        )
        .unwrap();
        assert_eq!(value(&resolution, "a", &Context::root()), "#FF00FF");
        assert_eq!(value(&resolution, "b", &Context::root()), "#FF00FF");
        assert_eq!(resolution.fallbacks().len(), 2);
    }

    #[test]
    fn test_per_kind_sentinel() {
        let mut spacing = root("space.card", "{space.missing}");
        spacing.kind = TokenKind::Spacing;
        let resolution = resolve(
            &extraction(vec![spacing]),
            &Sentinels::default().with_kind("spacing", "8px"),
        )
        .unwrap();
        assert_eq!(value(&resolution, "space-card", &Context::root()), "8px");
    }

    #[test]
    fn test_theme_override_follows_root_alias() {
        let resolution = resolve(
            &extraction(vec![
                root("color.neutral.900", "#111111"),
                token(
                    "color.text.primary",
                    "{color.neutral.900}",
                    Category::Semantic,
                    Context::root(),
                ),
                token(
                    "color.neutral.900",
                    "#EEEEEE",
                    Category::Option,
                    Context::theme("dark"),
                ),
                root("color.unrelated", "#123456"),
            ]),
            &Sentinels::default(),
        )
        .unwrap();

        let dark = Context::theme("dark");
        assert_eq!(value(&resolution, "color-text-primary", &Context::root()), "#111111");
        assert_eq!(value(&resolution, "color-neutral-900", &dark), "#EEEEEE");
        assert_eq!(value(&resolution, "color-text-primary", &dark), "#EEEEEE");
        assert!(resolution.get("color-unrelated", &dark).is_none());
    }

    #[test]
    fn test_combination_emits_only_cascade_corrections() {
        let dark = Context::theme("dark");
        let acme = Context::brand("acme");
        let resolution = resolve(
            &extraction(vec![
                root("color.brand", "#0000FF"),
                root("surface", "#FFFFFF"),
                token("surface", "{color.brand}", Category::Semantic, dark.clone()),
                token("color.brand", "#FF0000", Category::Semantic, acme.clone()),
            ]),
            &Sentinels::default(),
        )
        .unwrap();

        let combo = Context::combined("dark", "acme");
        assert_eq!(value(&resolution, "surface", &dark), "#0000FF");
        assert_eq!(value(&resolution, "color-brand", &acme), "#FF0000");
        assert!(resolution.get("surface", &acme).is_none());
        assert_eq!(value(&resolution, "surface", &combo), "#FF0000");
        assert!(resolution.get("color-brand", &combo).is_none());
        assert_eq!(
            resolution.contexts(),
            vec![&Context::root(), &dark, &acme, &combo]
        );
    }

    #[test]
    fn test_later_set_overrides_in_same_context() {
        let resolution = resolve(
            &extraction(vec![root("color.a", "#000"), root("color.a", "#111")]),
            &Sentinels::default(),
        )
        .unwrap();
        assert_eq!(resolution.len(), 1);
        assert_eq!(value(&resolution, "color-a", &Context::root()), "#111");
    }

    #[test]
    fn test_name_collision_across_sets() {
        let err = resolve(
            &extraction(vec![root("color.Brand", "#000"), root("color.brand", "#111")]),
            &Sentinels::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TokenError::NameCollision { .. }));
    }

    #[test]
    fn test_name_collision_with_inherited_token() {
        let dark = Context::theme("dark");
        let err = resolve(
            &extraction(vec![
                root("color.a-b", "#111111"),
                token("color.a.b", "#EEEEEE", Category::Option, dark.clone()),
            ]),
            &Sentinels::default(),
        )
        .unwrap_err();
        match err {
            TokenError::NameCollision { set, name, first, second } => {
                assert_eq!(set, format!("context {}", dark));
                assert_eq!(name, "color-a-b");
                assert_eq!(first.to_string(), "color.a.b");
                assert_eq!(second.to_string(), "color.a-b");
            }
            other => panic!("Expected NameCollision, got {:?}", other),
        }
    }

    #[test]
    fn test_output_sorted_by_name() {
        let resolution = resolve(
            &extraction(vec![root("zeta", "#000"), root("alpha", "#111"), root("mid", "#222")]),
            &Sentinels::default(),
        )
        .unwrap();
        let names: Vec<&str> = resolution.tokens().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::extract::TokenModule;
    use crate::token::Category;
    use proptest::prelude::*;

    /// Builds `count` tokens where token `i` either holds a literal or aliases
    /// a lower-numbered (or missing) token, so the graph is acyclic.
    fn chain_tokens(links: &[Option<usize>]) -> Vec<Token> {
        links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                let value = match link {
                    Some(target) if *target < i => format!("{{t.n{}}}", target),
                    Some(_) => "{t.missing}".to_string(),
                    None => format!("#{:06X}", i * 4099),
                };
                Token {
                    path: TokenPath::new(["t".to_string(), format!("n{}", i)]),
                    value: TokenValue::parse(&value),
                    category: Category::Option,
                    kind: TokenKind::Color,
                    module: "t".to_string(),
                    context: Context::root(),
                    description: None,
                }
            })
            .collect()
    }

    fn wrap(tokens: Vec<Token>) -> Extraction {
        Extraction {
            modules: vec![TokenModule {
                category: Category::Option,
                name: "t".to_string(),
                tokens,
            }],
            skipped: Vec::new(),
        }
    }

    proptest! {
        #[test]
        fn resolution_is_order_independent(
            links in prop::collection::vec(prop::option::of(0usize..24), 1..24),
            seed in any::<u64>(),
        ) {
            let tokens = chain_tokens(&links);
            let mut shuffled = tokens.clone();
            // Deterministic Fisher-Yates driven by the seed.
            let mut state = seed;
            for i in (1..shuffled.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                shuffled.swap(i, j);
            }

            let a = resolve(&wrap(tokens), &Sentinels::default()).unwrap();
            let b = resolve(&wrap(shuffled), &Sentinels::default()).unwrap();
            prop_assert_eq!(a.tokens(), b.tokens());
        }

        #[test]
        fn resolved_values_are_alias_free(
            links in prop::collection::vec(prop::option::of(0usize..16), 1..16),
        ) {
            let resolution = resolve(&wrap(chain_tokens(&links)), &Sentinels::default()).unwrap();
            for token in resolution.tokens() {
                prop_assert!(!token.value.contains('{'), "{} kept a reference", token.name);
            }
        }
    }
}
