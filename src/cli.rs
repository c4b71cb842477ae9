//! Command-line argument parsing
//!
//! Supports:
//! - Normalizing one or more files in place
//! - Check mode (report only, non-zero exit when a file would change)
//! - One-off overrides of the options file
//! - JSON reports

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::FormatOnSaveConfig;
use crate::pipeline::{PipelineReport, SkipReason, StepOutcome};

/// Normalize whitespace, line endings and end of file on save
#[derive(Parser, Debug)]
#[command(
    name = "format-on-save",
    version,
    about = "Normalize whitespace, line endings and end of file"
)]
pub struct CliArgs {
    /// Files to normalize
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Options file (default: ~/.config/format-on-save/config.yaml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report what would change without writing files
    #[arg(long)]
    pub check: bool,

    /// Print per-file reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Target line break: lf or crlf
    #[arg(long, value_name = "STYLE")]
    pub line_break: Option<String>,

    /// Tab width for every document, overriding per-language settings
    #[arg(long, value_name = "N")]
    pub tab_width: Option<usize>,

    /// Keep literal tabs in every document, overriding per-language settings
    #[arg(long)]
    pub insert_tabs: bool,

    /// Log pipeline steps to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Overrides of the options file given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub line_break: Option<String>,
    pub tab_width: Option<usize>,
    pub insert_tabs: bool,
}

impl ConfigOverrides {
    /// Apply the overrides. A flag given on the command line also replaces
    /// the matching per-language setting, so it holds for every document.
    pub fn apply(&self, config: &mut FormatOnSaveConfig) {
        if let Some(line_break) = &self.line_break {
            config.line_break = line_break.clone();
        }
        if let Some(tab_width) = self.tab_width {
            config.tab_width = tab_width;
            for settings in config.languages.values_mut() {
                settings.tab_width = None;
            }
        }
        if self.insert_tabs {
            config.insert_tabs = true;
            for settings in config.languages.values_mut() {
                settings.insert_tabs = None;
            }
        }
    }
}

/// Run configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub paths: Vec<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub check: bool,
    pub json: bool,
    pub overrides: ConfigOverrides,
    /// Console log level when RUST_LOG is unset
    pub log_level: &'static str,
}

impl CliArgs {
    /// Convert parsed CLI args into run options
    pub fn into_options(self) -> Result<RunOptions, String> {
        if self.paths.is_empty() {
            return Err("No files given".to_string());
        }
        if self.tab_width == Some(0) {
            return Err("--tab-width must be at least 1".to_string());
        }

        Ok(RunOptions {
            paths: self.paths,
            config_path: self.config,
            check: self.check,
            json: self.json,
            overrides: ConfigOverrides {
                line_break: self.line_break,
                tab_width: self.tab_width,
                insert_tabs: self.insert_tabs,
            },
            log_level: if self.verbose { "debug" } else { "warn" },
        })
    }
}

/// Serializable summary of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub step: &'static str,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub edits: usize,
}

/// Serializable summary of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub changed: bool,
    pub steps: Vec<StepSummary>,
}

impl FileSummary {
    pub fn from_report(path: &Path, report: &PipelineReport) -> Self {
        let steps = report
            .steps
            .iter()
            .map(|r| StepSummary {
                step: r.step.name(),
                outcome: r.outcome.kind(),
                detail: outcome_detail(&r.outcome),
                edits: r.outcome.edit_count(),
            })
            .collect();

        Self {
            path: path.to_path_buf(),
            changed: report.committed,
            steps,
        }
    }

    /// One human-readable line
    pub fn describe(&self) -> String {
        let status = if self.changed { "changed" } else { "unchanged" };
        let failures: Vec<String> = self
            .steps
            .iter()
            .filter(|s| matches!(s.outcome, "tool-failed" | "config-error" | "edit-failed"))
            .map(|s| match &s.detail {
                Some(detail) => format!("{}: {}", s.step, detail),
                None => s.step.to_string(),
            })
            .collect();

        if failures.is_empty() {
            format!("{}: {}", self.path.display(), status)
        } else {
            format!(
                "{}: {} ({})",
                self.path.display(),
                status,
                failures.join("; ")
            )
        }
    }
}

fn outcome_detail(outcome: &StepOutcome) -> Option<String> {
    match outcome {
        StepOutcome::Skipped(reason) => Some(
            match reason {
                SkipReason::Disabled => "disabled",
                SkipReason::Filtered => "filtered",
                SkipReason::LiteralTabs => "literal tabs",
                SkipReason::NotRequested => "not requested",
            }
            .to_string(),
        ),
        StepOutcome::ToolFailed(e) => Some(e.to_string()),
        StepOutcome::ConfigError(e) => Some(e.to_string()),
        StepOutcome::EditFailed(e) => Some(e.to_string()),
        StepOutcome::Unchanged | StepOutcome::Applied(_) | StepOutcome::ToolSucceeded => None,
    }
}
