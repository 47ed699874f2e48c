//! Running the stages end to end.
//!
//! Each `run_*` method loads and processes the input completely in memory and
//! only then writes its artifacts, so a fatal error at any stage leaves the
//! output directory as it was. Files are written through a temporary file in
//! the target directory and renamed into place, and files whose contents are
//! unchanged are not touched. A build also removes the artifacts of the
//! previous build that it no longer produces.

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::{digest, ChangeReport, TokenCache, CACHE_FILE};
use crate::config::PipelineConfig;
use crate::emit::{emit_css, module_artifacts, Artifact};
use crate::error::{Result, TokenError};
use crate::extract::{extract, Extraction, SkippedToken};
use crate::resolve::{resolve, Fallback, Resolution};
use crate::source::TokenSource;
use crate::utilities::{generate_utilities, DroppedUtility, UtilitySet};

/// The pipeline entry points, as exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Write per-module token files.
    Extract,
    /// Write the compiled CSS variable sheet.
    Compile,
    /// Write the utility stylesheet and Tailwind plugin.
    Utilities,
    /// All of the above, skipped when the input is unchanged.
    Build,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Extract => write!(f, "extract"),
            Command::Compile => write!(f, "compile"),
            Command::Utilities => write!(f, "utilities"),
            Command::Build => write!(f, "build"),
        }
    }
}

/// Non-fatal problems collected during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Warnings {
    /// Tokens that fell back to a sentinel.
    pub fallbacks: Vec<Fallback>,
    /// Leaves with composite values that were not extracted.
    pub skipped: Vec<SkippedToken>,
    /// Utility rules lost to class-name collisions.
    pub dropped_utilities: Vec<DroppedUtility>,
    /// Whether the fixed fallback utility set was emitted.
    pub fallback_utilities: bool,
}

impl Warnings {
    pub fn count(&self) -> usize {
        self.fallbacks.len()
            + self.skipped.len()
            + self.dropped_utilities.len()
            + usize::from(self.fallback_utilities)
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub command: Command,
    /// Files created or rewritten.
    pub written: Vec<PathBuf>,
    /// Files whose contents were already current.
    pub unchanged: Vec<PathBuf>,
    /// Artifacts of the previous build that this build no longer produces.
    pub removed: Vec<PathBuf>,
    /// Set when a build found the cache current and did nothing.
    pub up_to_date: bool,
    pub tokens: usize,
    pub changes: Option<ChangeReport>,
    pub warnings: Warnings,
}

impl RunReport {
    fn new(command: Command) -> Self {
        Self {
            command,
            written: Vec::new(),
            unchanged: Vec::new(),
            removed: Vec::new(),
            up_to_date: false,
            tokens: 0,
            changes: None,
            warnings: Warnings::default(),
        }
    }

    /// Logs the end-of-run summary: one line, plus one `debug!` per warning.
    pub fn log_summary(&self) {
        if self.up_to_date {
            info!(command = %self.command, "tokens unchanged, nothing to do");
            return;
        }

        if let Some(changes) = &self.changes {
            info!(
                added = changes.added.len(),
                removed = changes.removed.len(),
                changed = changes.changed.len(),
                "token changes since last build"
            );
            for key in &changes.added {
                debug!(token = %key, "added");
            }
            for key in &changes.removed {
                debug!(token = %key, "removed");
            }
            for key in &changes.changed {
                debug!(token = %key, "changed");
            }
        }

        for path in &self.removed {
            info!(path = %path.display(), "removed stale artifact");
        }

        let warnings = &self.warnings;
        for fallback in &warnings.fallbacks {
            debug!(
                token = %fallback.token,
                context = %fallback.context,
                missing = %fallback.missing,
                value = %fallback.value,
                "sentinel fallback"
            );
        }
        for skipped in &warnings.skipped {
            debug!(set = %skipped.set, token = %skipped.path, reason = %skipped.reason, "skipped token");
        }
        for dropped in &warnings.dropped_utilities {
            debug!(
                class = %dropped.class_name,
                kept = %dropped.kept,
                dropped = %dropped.dropped,
                "dropped duplicate utility"
            );
        }

        if warnings.is_empty() {
            info!(
                command = %self.command,
                tokens = self.tokens,
                written = self.written.len(),
                unchanged = self.unchanged.len(),
                "done"
            );
        } else {
            warn!(
                command = %self.command,
                tokens = self.tokens,
                written = self.written.len(),
                unchanged = self.unchanged.len(),
                fallbacks = warnings.fallbacks.len(),
                skipped = warnings.skipped.len(),
                dropped_utilities = warnings.dropped_utilities.len(),
                fallback_utilities = warnings.fallback_utilities,
                "done with warnings"
            );
        }
    }
}

/// Loaded input: raw bytes digest plus the parsed source.
struct Input {
    hash: String,
    source: TokenSource,
}

/// Runs pipeline stages for one configuration.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::new(PipelineConfig::load(None)?);
/// let report = pipeline.run_build(false)?;
/// report.log_summary();
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one command. `force` only affects [`Command::Build`].
    pub fn run(&self, command: Command, force: bool) -> Result<RunReport> {
        match command {
            Command::Extract => self.run_extract(),
            Command::Compile => self.run_compile(),
            Command::Utilities => self.run_utilities(),
            Command::Build => self.run_build(force),
        }
    }

    /// Writes `option-tokens/<module>.json` and `semantic-tokens/<module>.json`.
    pub fn run_extract(&self) -> Result<RunReport> {
        let input = self.load()?;
        let extraction = self.extract(&input.source)?;
        let artifacts = module_artifacts(&extraction)?;

        let mut report = RunReport::new(Command::Extract);
        report.tokens = extraction.token_count();
        report.warnings.skipped = extraction.skipped;
        self.write_all(&artifacts, &mut report)?;
        Ok(report)
    }

    /// Writes the compiled CSS variable sheet.
    pub fn run_compile(&self) -> Result<RunReport> {
        let input = self.load()?;
        let extraction = self.extract(&input.source)?;
        let resolution = self.resolve(&extraction)?;
        let artifact = self.css_artifact(&resolution);

        let mut report = RunReport::new(Command::Compile);
        report.tokens = resolution.len();
        report.warnings.skipped = extraction.skipped;
        report.warnings.fallbacks = resolution.fallbacks().to_vec();
        self.write_all(&[artifact], &mut report)?;
        Ok(report)
    }

    /// Writes the utility stylesheet and the Tailwind plugin.
    pub fn run_utilities(&self) -> Result<RunReport> {
        let input = self.load()?;
        let extraction = self.extract(&input.source)?;
        let resolution = self.resolve(&extraction)?;
        let utilities = self.utilities(&resolution);
        let artifacts = self.utility_artifacts(&utilities);

        let mut report = RunReport::new(Command::Utilities);
        report.tokens = resolution.len();
        report.warnings.skipped = extraction.skipped;
        report.warnings.fallbacks = resolution.fallbacks().to_vec();
        report.warnings.dropped_utilities = utilities.dropped().to_vec();
        report.warnings.fallback_utilities = utilities.used_fallback();
        self.write_all(&artifacts, &mut report)?;
        Ok(report)
    }

    /// Runs every stage and records the result in the token cache.
    ///
    /// Skipped when the cache says the input, the configuration and the
    /// outputs are current, unless `force` is set. Artifacts the previous
    /// build wrote and this one does not are deleted after the write.
    pub fn run_build(&self, force: bool) -> Result<RunReport> {
        let input = self.load()?;
        let config_hash = self.config.fingerprint()?;
        let cache_path = self.config.output_dir.join(CACHE_FILE);
        let previous = TokenCache::load(&cache_path);

        if !force
            && previous.as_ref().is_some_and(|cache| {
                cache.is_current(&input.hash, &config_hash, &self.config.output_dir)
            })
        {
            let mut report = RunReport::new(Command::Build);
            report.up_to_date = true;
            return Ok(report);
        }

        let extraction = self.extract(&input.source)?;
        let resolution = self.resolve(&extraction)?;
        let utilities = self.utilities(&resolution);

        let mut artifacts = module_artifacts(&extraction)?;
        artifacts.push(self.css_artifact(&resolution));
        artifacts.extend(self.utility_artifacts(&utilities));

        let cache = TokenCache::snapshot(input.hash, &extraction)
            .with_config_hash(config_hash)
            .with_outputs(artifacts.iter().map(|a| a.path.clone()));
        let changes = cache.diff(previous.as_ref());
        artifacts.push(Artifact::new(CACHE_FILE, cache.render()?));

        let mut report = RunReport::new(Command::Build);
        report.tokens = resolution.len();
        report.changes = Some(changes);
        report.warnings = Warnings {
            fallbacks: resolution.fallbacks().to_vec(),
            skipped: extraction.skipped,
            dropped_utilities: utilities.dropped().to_vec(),
            fallback_utilities: utilities.used_fallback(),
        };
        self.write_all(&artifacts, &mut report)?;
        if let Some(previous) = &previous {
            self.remove_stale(&previous.outputs, &cache.outputs, &mut report)?;
        }
        Ok(report)
    }

    fn load(&self) -> Result<Input> {
        let path = &self.config.input;
        info!(path = %path.display(), "loading tokens");
        let bytes = std::fs::read(path).map_err(|source| TokenError::Read {
            path: path.clone(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|e| TokenError::Parse {
            path: Some(path.clone()),
            message: e.to_string(),
        })?;
        let hash = digest(text.as_bytes());
        let source = TokenSource::parse(&text, Some(path))?;
        Ok(Input { hash, source })
    }

    fn extract(&self, source: &TokenSource) -> Result<Extraction> {
        extract(source, &self.config.schema, &self.config.default_theme)
    }

    fn resolve(&self, extraction: &Extraction) -> Result<Resolution> {
        resolve(extraction, &self.config.sentinels)
    }

    fn utilities(&self, resolution: &Resolution) -> UtilitySet {
        let utilities = generate_utilities(resolution.tokens(), self.config.duplicate_policy);
        if utilities.used_fallback() {
            warn!("no semantic text/fill/stroke tokens found, emitting fallback utilities");
        }
        utilities
    }

    fn css_artifact(&self, resolution: &Resolution) -> Artifact {
        Artifact::new(
            &self.config.css_file,
            emit_css(resolution, &self.config.selectors),
        )
    }

    fn utility_artifacts(&self, utilities: &UtilitySet) -> Vec<Artifact> {
        vec![
            Artifact::new(&self.config.utilities_css_file, utilities.to_css()),
            Artifact::new(
                &self.config.tailwind_plugin_file,
                utilities.to_tailwind_plugin(),
            ),
        ]
    }

    fn write_all(&self, artifacts: &[Artifact], report: &mut RunReport) -> Result<()> {
        for artifact in artifacts {
            let path = self.config.output_dir.join(&artifact.path);
            if write_if_changed(&path, &artifact.contents)? {
                debug!(path = %path.display(), "wrote");
                report.written.push(path);
            } else {
                debug!(path = %path.display(), "unchanged");
                report.unchanged.push(path);
            }
        }
        Ok(())
    }

    /// Deletes files listed in `previous` but not in `current`. Entries that
    /// would escape the output directory are ignored.
    fn remove_stale(
        &self,
        previous: &[PathBuf],
        current: &[PathBuf],
        report: &mut RunReport,
    ) -> Result<()> {
        for stale in previous.iter().filter(|p| !current.contains(p)) {
            if !is_contained(stale) {
                warn!(path = %stale.display(), "ignoring cached output outside the output directory");
                continue;
            }
            let path = self.config.output_dir.join(stale);
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed");
                    report.removed.push(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(TokenError::write(&path, e)),
            }
        }
        Ok(())
    }
}

/// Whether a relative artifact path stays below the directory it is joined to.
fn is_contained(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
}

/// Atomically replaces `path` with `contents` unless it already holds them.
/// Returns whether the file was written.
fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    if std::fs::read(path).is_ok_and(|existing| existing == contents.as_bytes()) {
        return Ok(false);
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| TokenError::write(path, e))?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| TokenError::write(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| TokenError::write(path, e))?;
    file.persist(path)
        .map_err(|e| TokenError::write(path, e.error))?;
    Ok(true)
}
