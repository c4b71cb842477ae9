//! Save pipeline - runs the enabled steps in order inside one undo scope
//!
//! Step order is fixed:
//! 1. tab expansion
//! 2. external sort tool
//! 3. external format tool
//! 4. second tab expansion (opt-in, for formatters that reintroduce tabs)
//! 5. line-break unification
//! 6. end-of-file normalization
//!
//! Each step is gated by its own enabled flag and filter. A failing external
//! tool or a misconfigured step only affects itself: the remaining steps run
//! and edits already applied stay applied.

use crate::buffer::{BufferAccess, MemoryBuffer, Transaction};
use crate::config::FormatOnSaveConfig;
use crate::filter::{FilterError, FilterPolicy, PathFilter};
use crate::model::{Document, EditBatch, EditError, TextSnapshot};
use crate::tools::{ExternalTool, ToolCommand, ToolError};
use crate::transform::{
    tab_to_space, unify_end_of_file, unify_line_breaks, ConfigurationError, LineBreakStyle,
};

/// Undo entry label for one pipeline run
pub const TRANSACTION_LABEL: &str = "Format on save";

/// Pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    TabToSpace,
    SortTool,
    FormatTool,
    RetabAfterFormat,
    UnifyLineBreak,
    UnifyEndOfFile,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::TabToSpace,
        Step::SortTool,
        Step::FormatTool,
        Step::RetabAfterFormat,
        Step::UnifyLineBreak,
        Step::UnifyEndOfFile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::TabToSpace => "tab-to-space",
            Step::SortTool => "sort",
            Step::FormatTool => "format",
            Step::RetabAfterFormat => "retab-after-format",
            Step::UnifyLineBreak => "unify-line-break",
            Step::UnifyEndOfFile => "unify-end-of-file",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a step did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Turned off in the options
    Disabled,
    /// The step's filter rejected the document
    Filtered,
    /// The document keeps literal tabs
    LiteralTabs,
    /// Second tab pass not requested for this language
    NotRequested,
}

/// What happened in one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Skipped(SkipReason),
    /// Ran and found nothing to change
    Unchanged,
    /// Ran and applied this batch
    Applied(EditBatch),
    ToolSucceeded,
    ToolFailed(ToolError),
    ConfigError(ConfigurationError),
    EditFailed(EditError),
}

impl StepOutcome {
    /// Number of edit operations the step applied (0 for tool steps)
    pub fn edit_count(&self) -> usize {
        match self {
            StepOutcome::Applied(batch) => batch.len(),
            _ => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StepOutcome::ToolFailed(_) | StepOutcome::ConfigError(_) | StepOutcome::EditFailed(_)
        )
    }

    /// Short machine-friendly label
    pub fn kind(&self) -> &'static str {
        match self {
            StepOutcome::Skipped(_) => "skipped",
            StepOutcome::Unchanged => "unchanged",
            StepOutcome::Applied(_) => "applied",
            StepOutcome::ToolSucceeded => "tool-succeeded",
            StepOutcome::ToolFailed(_) => "tool-failed",
            StepOutcome::ConfigError(_) => "config-error",
            StepOutcome::EditFailed(_) => "edit-failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    pub outcome: StepOutcome,
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
    /// An undo entry was recorded (the buffer changed)
    pub committed: bool,
}

impl PipelineReport {
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|report| report.step == step)
            .map(|report| &report.outcome)
    }

    /// Edit operations applied by the built-in steps
    pub fn edit_count(&self) -> usize {
        self.steps.iter().map(|r| r.outcome.edit_count()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> + '_ {
        self.steps.iter().filter(|r| r.outcome.is_failure())
    }
}

/// Which steps run and how, fixed for one save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub enable_tab_to_space: bool,
    pub enable_sort_tool: bool,
    pub enable_format_tool: bool,
    pub enable_unify_line_break: bool,
    /// Target style, parsed when the step runs
    pub line_break: String,
    pub enable_unify_end_of_file: bool,
    /// Languages that get the second tab pass after formatting
    pub legacy_retab_languages: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&FormatOnSaveConfig::default())
    }
}

impl From<&FormatOnSaveConfig> for PipelineOptions {
    fn from(config: &FormatOnSaveConfig) -> Self {
        Self {
            enable_tab_to_space: config.enable_tab_to_space,
            enable_sort_tool: config.enable_sort_tool,
            enable_format_tool: config.enable_format_tool,
            enable_unify_line_break: config.enable_unify_line_break,
            line_break: config.line_break.clone(),
            enable_unify_end_of_file: config.enable_unify_end_of_file,
            legacy_retab_languages: config.legacy_retab_languages.clone(),
        }
    }
}

/// The save-time normalization pipeline
pub struct Pipeline {
    options: PipelineOptions,
    filter: Box<dyn FilterPolicy>,
    format_filter: Box<dyn FilterPolicy>,
    sort_filter: Box<dyn FilterPolicy>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Per-run state: the general filter is evaluated at most once per document
struct RunContext<'a> {
    document: &'a Document,
    allowed: Option<bool>,
}

impl Pipeline {
    /// A pipeline whose filters allow every document
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            filter: Box::new(PathFilter::allow_all()),
            format_filter: Box::new(PathFilter::allow_all()),
            sort_filter: Box::new(PathFilter::allow_all()),
        }
    }

    /// Build options and filters from the options file
    pub fn from_config(config: &FormatOnSaveConfig) -> Result<Self, FilterError> {
        Ok(Self::new(PipelineOptions::from(config))
            .with_filter(PathFilter::from_config(&config.filter)?)
            .with_format_filter(PathFilter::from_config(&config.format_filter)?)
            .with_sort_filter(PathFilter::from_config(&config.sort_filter)?))
    }

    /// Filter for tab expansion, line-break and end-of-file steps
    pub fn with_filter(mut self, filter: impl FilterPolicy + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_format_filter(mut self, filter: impl FilterPolicy + 'static) -> Self {
        self.format_filter = Box::new(filter);
        self
    }

    pub fn with_sort_filter(mut self, filter: impl FilterPolicy + 'static) -> Self {
        self.sort_filter = Box::new(filter);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run every step against the host buffer inside one transaction.
    ///
    /// The transaction is committed when anything may have changed and
    /// discarded otherwise, so a no-op save leaves no undo entry.
    pub fn run(
        &self,
        document: &Document,
        buffer: &mut dyn BufferAccess,
        tools: &mut dyn ExternalTool,
    ) -> PipelineReport {
        let span = tracing::debug_span!("format_on_save", path = %document.path.display());
        let _enter = span.enter();

        let mut ctx = RunContext {
            document,
            allowed: None,
        };
        let mut txn = Transaction::begin(buffer, TRANSACTION_LABEL);
        let mut steps = Vec::with_capacity(Step::ALL.len());

        for step in Step::ALL {
            let outcome = self.run_step(step, &mut ctx, &mut *txn, tools);
            log_outcome(step, &outcome);
            steps.push(StepReport { step, outcome });
        }

        let touched = steps.iter().any(|r| {
            matches!(
                r.outcome,
                StepOutcome::Applied(_) | StepOutcome::ToolSucceeded
            )
        });

        let committed = if touched {
            txn.complete()
        } else {
            txn.discard();
            false
        };

        if committed {
            tracing::info!(
                "Normalized {} ({} edits)",
                document.display_name(),
                steps.iter().map(|r| r.outcome.edit_count()).sum::<usize>()
            );
        }

        PipelineReport { steps, committed }
    }

    /// Run the pipeline against a scratch copy of `snapshot`.
    ///
    /// Returns the resulting snapshot and the report; no host buffer is
    /// touched.
    pub fn normalize(
        &self,
        document: &Document,
        snapshot: &TextSnapshot,
        tools: &mut dyn ExternalTool,
    ) -> (TextSnapshot, PipelineReport) {
        let mut scratch = MemoryBuffer::from_snapshot(snapshot.clone());
        let report = self.run(document, &mut scratch, tools);
        (scratch.snapshot(), report)
    }

    fn run_step(
        &self,
        step: Step,
        ctx: &mut RunContext<'_>,
        buffer: &mut dyn BufferAccess,
        tools: &mut dyn ExternalTool,
    ) -> StepOutcome {
        let options = &self.options;
        match step {
            Step::TabToSpace => {
                if let Some(reason) = self.tab_gate(ctx) {
                    return StepOutcome::Skipped(reason);
                }
                expand_tabs(ctx.document, buffer)
            }
            Step::SortTool => {
                if !options.enable_sort_tool {
                    return StepOutcome::Skipped(SkipReason::Disabled);
                }
                if !self.sort_filter.is_allowed(ctx.document) {
                    return StepOutcome::Skipped(SkipReason::Filtered);
                }
                invoke_tool(ToolCommand::SortImports, ctx.document, buffer, tools)
            }
            Step::FormatTool => {
                if !options.enable_format_tool {
                    return StepOutcome::Skipped(SkipReason::Disabled);
                }
                if !self.format_filter.is_allowed(ctx.document) {
                    return StepOutcome::Skipped(SkipReason::Filtered);
                }
                invoke_tool(ToolCommand::FormatDocument, ctx.document, buffer, tools)
            }
            Step::RetabAfterFormat => {
                if !options.enable_tab_to_space {
                    return StepOutcome::Skipped(SkipReason::Disabled);
                }
                let requested = options
                    .legacy_retab_languages
                    .iter()
                    .any(|name| ctx.document.language.matches_name(name));
                if !requested {
                    return StepOutcome::Skipped(SkipReason::NotRequested);
                }
                if let Some(reason) = self.tab_gate(ctx) {
                    return StepOutcome::Skipped(reason);
                }
                expand_tabs(ctx.document, buffer)
            }
            Step::UnifyLineBreak => {
                if !options.enable_unify_line_break {
                    return StepOutcome::Skipped(SkipReason::Disabled);
                }
                if !self.is_allowed(ctx) {
                    return StepOutcome::Skipped(SkipReason::Filtered);
                }
                let style = match options.line_break.parse::<LineBreakStyle>() {
                    Ok(style) => style,
                    Err(e) => return StepOutcome::ConfigError(e),
                };
                let snapshot = buffer.snapshot();
                apply_batch(buffer, unify_line_breaks(&snapshot, style))
            }
            Step::UnifyEndOfFile => {
                if !options.enable_unify_end_of_file {
                    return StepOutcome::Skipped(SkipReason::Disabled);
                }
                if !self.is_allowed(ctx) {
                    return StepOutcome::Skipped(SkipReason::Filtered);
                }
                let snapshot = buffer.snapshot();
                apply_batch(buffer, unify_end_of_file(&snapshot))
            }
        }
    }

    /// Shared gating of both tab expansion passes
    fn tab_gate(&self, ctx: &mut RunContext<'_>) -> Option<SkipReason> {
        if !self.options.enable_tab_to_space {
            Some(SkipReason::Disabled)
        } else if !self.is_allowed(ctx) {
            Some(SkipReason::Filtered)
        } else if ctx.document.insert_tabs {
            Some(SkipReason::LiteralTabs)
        } else {
            None
        }
    }

    fn is_allowed(&self, ctx: &mut RunContext<'_>) -> bool {
        if let Some(allowed) = ctx.allowed {
            return allowed;
        }
        let allowed = self.filter.is_allowed(ctx.document);
        ctx.allowed = Some(allowed);
        allowed
    }
}

fn expand_tabs(document: &Document, buffer: &mut dyn BufferAccess) -> StepOutcome {
    let snapshot = buffer.snapshot();
    match tab_to_space(&snapshot, document.tab_width) {
        Ok(batch) => apply_batch(buffer, batch),
        Err(e) => StepOutcome::ConfigError(e),
    }
}

fn invoke_tool(
    command: ToolCommand,
    document: &Document,
    buffer: &mut dyn BufferAccess,
    tools: &mut dyn ExternalTool,
) -> StepOutcome {
    match tools.invoke(command, document, buffer) {
        Ok(()) => StepOutcome::ToolSucceeded,
        Err(e) => StepOutcome::ToolFailed(e),
    }
}

fn apply_batch(buffer: &mut dyn BufferAccess, batch: EditBatch) -> StepOutcome {
    if batch.is_empty() {
        return StepOutcome::Unchanged;
    }
    match buffer.apply(&batch) {
        Ok(_) => StepOutcome::Applied(batch),
        Err(e) => StepOutcome::EditFailed(e),
    }
}

fn log_outcome(step: Step, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::ToolFailed(e) => tracing::warn!("{} step skipped: {}", step, e),
        StepOutcome::ConfigError(e) => tracing::warn!("{} step not run: {}", step, e),
        StepOutcome::EditFailed(e) => tracing::warn!("{} step edits rejected: {}", step, e),
        StepOutcome::Applied(batch) => {
            tracing::debug!("{} applied {} edits", step, batch.len())
        }
        StepOutcome::Skipped(reason) => tracing::debug!("{} skipped ({:?})", step, reason),
        StepOutcome::Unchanged | StepOutcome::ToolSucceeded => {
            tracing::debug!("{} {}", step, outcome.kind())
        }
    }
}
