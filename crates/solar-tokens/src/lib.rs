//! Solar Tokens - design-token pipeline for TokenStudio exports.
//!
//! Turns a TokenStudio `tokens.json` into the artifacts a Tailwind front end
//! consumes:
//!
//! - Per-module token files split into option and semantic buckets
//! - A compiled CSS sheet of custom properties, one block per theme/brand
//! - Utility classes for semantic color roles, as CSS and as a Tailwind plugin
//!
//! # Quick Start
//!
//! ```rust
//! use solar_tokens::{emit_css, extract, resolve, Schema, SelectorConfig, Sentinels, TokenSource};
//!
//! let source: TokenSource = r##"{
//!   "color": {
//!     "brand": { "primary": { "rest": { "value": "#1A73E8", "type": "color" } } },
//!     "text":  { "primary": { "rest": { "value": "{color.brand.primary.rest}", "type": "color" } } }
//!   }
//! }"##.parse().unwrap();
//!
//! let extraction = extract(&source, &Schema::default(), "light").unwrap();
//! let resolution = resolve(&extraction, &Sentinels::default()).unwrap();
//! let css = emit_css(&resolution, &SelectorConfig::default());
//!
//! assert!(css.contains("--color-brand-primary-rest: #1A73E8;"));
//! assert!(css.contains("--color-text-primary-rest: #1A73E8;"));
//! ```
//!
//! # Stages
//!
//! ```text
//! tokens.json -> source -> extract -> resolve -> emit (CSS, modules)
//!                              |                 \-> utilities
//!                              \-> cache (change detection)
//! ```
//!
//! Top-level token sets are checked against a declared [`Schema`]; an unknown
//! set fails the run instead of being guessed into a bucket. Token values are
//! classified once, at load time, as literals, whole-value aliases, or
//! literals with embedded references ([`TokenValue`]).
//!
//! # Error Model
//!
//! | Problem | Handling |
//! |---------|----------|
//! | Missing or invalid input | fatal [`TokenError`], nothing written |
//! | Unknown token set, duplicate path | fatal [`TokenError`] |
//! | Circular alias | fatal, every cycle listed |
//! | Alias to a missing token | sentinel value, counted in [`Warnings`] |
//! | No utility-producing tokens | fallback utility set, counted in [`Warnings`] |
//!
//! [`Pipeline`] runs the stages and writes the results; every artifact is
//! computed before the first file is touched.

mod cache;
mod config;
mod emit;
mod error;
mod extract;
mod pipeline;
mod resolve;
mod schema;
mod source;
mod token;
mod utilities;

pub use cache::{digest, ChangeReport, TokenCache, CACHE_FILE};
pub use config::{PipelineConfig, DEFAULT_CONFIG_FILE};
pub use emit::{emit_css, module_artifacts, render_module, Artifact, SelectorConfig};
pub use error::{CycleError, Result, Stage, TokenError};
pub use extract::{extract, Extraction, SkippedToken, TokenModule};
pub use pipeline::{Command, Pipeline, RunReport, Warnings};
pub use resolve::{resolve, Fallback, Resolution, Sentinels, DEFAULT_SENTINEL};
pub use schema::{normalize_variant, ContextKind, Schema, SetBinding, SetRule};
pub use source::{Node, TokenSource};
pub use token::{
    Category, Context, ResolvedToken, Token, TokenKind, TokenPath, TokenValue, ValuePart,
};
pub use utilities::{
    generate_utilities, DroppedUtility, DuplicatePolicy, Role, State, UtilityClassRule,
    UtilitySet, FALLBACK_UTILITIES,
};
