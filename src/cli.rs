// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::Path;

use clap::{Parser, ValueEnum};

use crate::config::RawConfigFile;
use crate::types::ErrorPolicy;

/// Command-line arguments for `pollwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pollwatch",
    version,
    about = "Poll directory trees and report added, modified and removed files.",
    long_about = None
)]
pub struct CliArgs {
    /// Directories (or single files) to watch.
    ///
    /// Overrides `[watch].roots`; default is the current directory.
    #[arg(value_name = "ROOT")]
    pub roots: Vec<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Pollwatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Poll interval, e.g. `500ms`, `2s`, `1m`.
    #[arg(long, short = 'i', value_name = "DURATION")]
    pub interval: Option<String>,

    /// Track files with this extension (repeatable). Default: `go`.
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Track files matching this glob (repeatable); replaces `--ext`.
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Ignore files matching this glob (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// What to do with unreadable entries: `abort` or `skip`.
    #[arg(long, value_name = "POLICY")]
    pub on_error: Option<ErrorPolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `POLLWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate config, run the baseline scan, print a summary and exit.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref().map(Path::new)
    }

    /// Overlay flags that were given on top of the file / default config.
    pub fn apply_to(&self, raw: &mut RawConfigFile) {
        let watch = &mut raw.watch;
        if !self.roots.is_empty() {
            watch.roots = self.roots.clone();
        }
        if let Some(ref interval) = self.interval {
            watch.interval = interval.clone();
        }
        if !self.extensions.is_empty() {
            watch.extensions = self.extensions.clone();
        }
        if !self.include.is_empty() {
            watch.include = self.include.clone();
        }
        if !self.exclude.is_empty() {
            watch.exclude.extend(self.exclude.iter().cloned());
        }
        if let Some(policy) = self.on_error {
            watch.on_error = policy;
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let args = CliArgs::try_parse_from([
            "pollwatch",
            "src",
            "cmd",
            "--interval",
            "250ms",
            "--ext",
            "rs",
            "--exclude",
            "**/target/**",
            "--on-error",
            "skip",
        ])
        .unwrap();

        let mut raw = RawConfigFile::default();
        raw.watch.exclude.push("**/.git/**".to_string());
        args.apply_to(&mut raw);

        assert_eq!(raw.watch.roots, vec!["src", "cmd"]);
        assert_eq!(raw.watch.interval, "250ms");
        assert_eq!(raw.watch.extensions, vec!["rs"]);
        assert_eq!(raw.watch.exclude, vec!["**/.git/**", "**/target/**"]);
        assert_eq!(raw.watch.on_error, ErrorPolicy::Skip);
    }

    #[test]
    fn no_flags_keep_defaults() {
        let args = CliArgs::try_parse_from(["pollwatch"]).unwrap();
        let mut raw = RawConfigFile::default();
        args.apply_to(&mut raw);

        assert_eq!(raw.watch.roots, vec!["."]);
        assert_eq!(raw.watch.extensions, vec!["go"]);
        assert_eq!(raw.watch.on_error, ErrorPolicy::Abort);
    }

    #[test]
    fn invalid_policy_is_rejected() {
        assert!(CliArgs::try_parse_from(["pollwatch", "--on-error", "retry"]).is_err());
    }
}
