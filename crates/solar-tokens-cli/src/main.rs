//! `solar-tokens` - build design tokens from a TokenStudio export.
//!
//! ```text
//! solar-tokens                 # same as `solar-tokens build`
//! solar-tokens build --force   # rebuild even if tokens.json is unchanged
//! solar-tokens compile --input design/tokens.json --out-dir dist/tokens
//! ```
//!
//! Exits non-zero when any stage fails, so a CI build stops instead of
//! shipping a stale or broken stylesheet.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use solar_tokens::{Command, Pipeline, PipelineConfig, RunReport};
use tracing_subscriber::EnvFilter;

/// Design-token pipeline: TokenStudio JSON to CSS variables and Tailwind utilities
#[derive(Debug, Parser)]
#[command(name = "solar-tokens", version, about)]
struct Cli {
    /// Config file (defaults to ./solar-tokens.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Token file to read, overriding the config
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output directory, overriding the config
    #[arg(short, long, global = true)]
    out_dir: Option<PathBuf>,

    /// Log per-token detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every stage (default)
    Build {
        /// Rebuild even when the input hash matches the cache
        #[arg(short, long)]
        force: bool,
    },
    /// Write per-module token files
    Extract,
    /// Write the compiled CSS variable sheet
    Compile,
    /// Write utility classes and the Tailwind plugin
    Utilities,
}

impl Cli {
    fn selected(&self) -> (Command, bool) {
        match self.command {
            None => (Command::Build, false),
            Some(Commands::Build { force }) => (Command::Build, force),
            Some(Commands::Extract) => (Command::Extract, false),
            Some(Commands::Compile) => (Command::Compile, false),
            Some(Commands::Utilities) => (Command::Utilities, false),
        }
    }

    fn log_filter(&self) -> EnvFilter {
        let default = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    }

    fn config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())
            .context("config stage failed")?;
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(out_dir) = &self.out_dir {
            config.output_dir = out_dir.clone();
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<RunReport> {
    let config = cli.config()?;
    let (command, force) = cli.selected();
    Pipeline::new(config).run(command, force).map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{} stage failed", stage))
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(report) => {
            report.log_summary();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_build() {
        let cli = Cli::try_parse_from(["solar-tokens"]).unwrap();
        assert_eq!(cli.selected(), (Command::Build, false));
    }

    #[test]
    fn test_build_force() {
        let cli = Cli::try_parse_from(["solar-tokens", "build", "--force"]).unwrap();
        assert_eq!(cli.selected(), (Command::Build, true));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "solar-tokens",
            "compile",
            "--input",
            "design/tokens.json",
            "--out-dir",
            "dist",
        ])
        .unwrap();
        assert_eq!(cli.selected(), (Command::Compile, false));
        assert_eq!(cli.input, Some(PathBuf::from("design/tokens.json")));
        assert_eq!(cli.out_dir, Some(PathBuf::from("dist")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["solar-tokens", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("solar-tokens.yaml");
        std::fs::write(&config_path, "input: a.json\noutput_dir: a\n").unwrap();

        let cli = Cli::try_parse_from([
            "solar-tokens",
            "--config",
            config_path.to_str().unwrap(),
            "--out-dir",
            "b",
        ])
        .unwrap();
        let config = cli.config().unwrap();
        assert_eq!(config.input, dir.path().join("a.json"));
        assert_eq!(config.output_dir, PathBuf::from("b"));
    }

    #[test]
    fn test_failure_names_stage() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("tokens.json");
        let cli = Cli::try_parse_from([
            "solar-tokens",
            "compile",
            "--input",
            missing.to_str().unwrap(),
            "--out-dir",
            dir.path().join("out").to_str().unwrap(),
        ])
        .unwrap();

        let err = run(&cli).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("load stage failed: failed to read"));
        assert!(!dir.path().join("out").exists());
    }
}
