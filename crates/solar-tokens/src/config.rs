//! Pipeline configuration.
//!
//! Every field has a default, so a missing config file is a valid setup. A
//! YAML file can override any of them:
//!
//! ```yaml
//! input: design/tokens.json
//! output_dir: src/styles/tokens
//! default_theme: light
//! selectors:
//!   theme_attribute: data-theme
//!   brand_attribute: data-brand
//! sentinels:
//!   default: "#CCCCCC"
//!   by_kind:
//!     spacing: 8px
//! duplicate_policy: keep-first
//! schema:
//!   color: { category: option, module: colors, context: theme }
//!   brands: { category: semantic, module: brands, context: brand }
//! ```
//!
//! Relative paths in a config file are resolved against the file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::digest;
use crate::emit::SelectorConfig;
use crate::error::{Result, TokenError};
use crate::resolve::Sentinels;
use crate::schema::Schema;
use crate::utilities::DuplicatePolicy;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "solar-tokens.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// TokenStudio export to read.
    pub input: PathBuf,
    /// Directory every artifact is written under.
    pub output_dir: PathBuf,
    pub css_file: String,
    pub utilities_css_file: String,
    pub tailwind_plugin_file: String,
    pub schema: Schema,
    /// Theme that renders at `:root` rather than under a theme selector.
    pub default_theme: String,
    pub selectors: SelectorConfig,
    pub sentinels: Sentinels,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("tokens.json"),
            output_dir: PathBuf::from("src/styles/tokens"),
            css_file: "compiled-tokens.css".to_string(),
            utilities_css_file: "utilities.css".to_string(),
            tailwind_plugin_file: "tailwind-utilities.js".to_string(),
            schema: Schema::default(),
            default_theme: "light".to_string(),
            selectors: SelectorConfig::default(),
            sentinels: Sentinels::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses configuration from YAML text.
    ///
    /// An empty document yields the defaults.
    ///
    /// ```rust
    /// use solar_tokens::PipelineConfig;
    ///
    /// let config = PipelineConfig::from_yaml("default_theme: dark\n").unwrap();
    /// assert_eq!(config.default_theme, "dark");
    /// assert_eq!(config.css_file, "compiled-tokens.css");
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| TokenError::Config {
            path: None,
            message: e.to_string(),
        })
    }

    /// Reads a config file and resolves its relative paths against the
    /// file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TokenError::Config {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })?;
        let mut config = Self::from_yaml(&content).map_err(|e| match e {
            TokenError::Config { message, .. } => TokenError::Config {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })?;

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.input = base.join(&config.input);
            config.output_dir = base.join(&config.output_dir);
        }
        Ok(config)
    }

    /// Loads configuration for a run.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in
    /// the working directory is used when present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    debug!(path = %path.display(), "using config file");
                    Self::from_file(path)
                } else {
                    debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn css_path(&self) -> PathBuf {
        self.output_dir.join(&self.css_file)
    }

    /// Hex digest of the settings, used to invalidate the build cache when
    /// the configuration changes.
    pub fn fingerprint(&self) -> Result<String> {
        let json = serde_json::to_string(self).map_err(|e| TokenError::Config {
            path: None,
            message: e.to_string(),
        })?;
        Ok(digest(json.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ContextKind;
    use crate::token::{Category, TokenKind};

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(PipelineConfig::from_yaml("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let config = PipelineConfig::from_yaml(
            r##"
input: design/tokens.json
output_dir: out
default_theme: dark
selectors:
  theme_attribute: data-mode
sentinels:
  default: "#FF00FF"
  by_kind:
    spacing: 8px
duplicate_policy: keep-last
schema:
  palette:
    category: option
    module: colors
    context: theme
"##,
        )
        .unwrap();

        assert_eq!(config.input, PathBuf::from("design/tokens.json"));
        assert_eq!(config.default_theme, "dark");
        assert_eq!(config.selectors.theme_attribute, "data-mode");
        assert_eq!(config.selectors.brand_attribute, "data-brand");
        assert_eq!(config.sentinels.for_kind(&TokenKind::Spacing), "8px");
        assert_eq!(config.sentinels.for_kind(&TokenKind::Color), "#FF00FF");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::KeepLast);

        let rule = config.schema.get("palette").unwrap();
        assert_eq!(rule.category, Category::Option);
        assert_eq!(rule.context, ContextKind::Theme);
        assert!(config.schema.get("color").is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = PipelineConfig::from_yaml("outptu_dir: x\n").unwrap_err();
        assert!(matches!(err, TokenError::Config { .. }));
        assert!(err.to_string().contains("outptu_dir"));
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solar-tokens.yaml");
        std::fs::write(&path, "input: tokens.json\noutput_dir: out\n").unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.input, dir.path().join("tokens.json"));
        assert_eq!(config.css_path(), dir.path().join("out/compiled-tokens.css"));
    }

    #[test]
    fn test_fingerprint_tracks_settings() {
        let base = PipelineConfig::default();
        assert_eq!(base.fingerprint().unwrap(), PipelineConfig::default().fingerprint().unwrap());

        let changed = PipelineConfig {
            sentinels: Sentinels::new("#FF00FF"),
            ..PipelineConfig::default()
        };
        assert_ne!(base.fingerprint().unwrap(), changed.fingerprint().unwrap());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = PipelineConfig::load(Some(Path::new("/no/such/solar-tokens.yaml"))).unwrap_err();
        match err {
            TokenError::Config { path: Some(p), .. } => {
                assert!(p.ends_with("solar-tokens.yaml"))
            }
            other => panic!("Expected Config error, got {:?}", other),
        }
    }
}
