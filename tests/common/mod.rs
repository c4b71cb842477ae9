//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use format_on_save::buffer::{BufferAccess, MemoryBuffer};
use format_on_save::config::FormatOnSaveConfig;
use format_on_save::model::{Document, EditBatch, TextSnapshot};
use format_on_save::pipeline::{Pipeline, PipelineReport};
use format_on_save::tools::{ExternalTool, NoTools, ToolCommand, ToolError};

/// Apply a batch to the snapshot it was computed against and return the text
pub fn apply_to_string(snapshot: &TextSnapshot, batch: &EditBatch) -> String {
    snapshot.apply(batch).unwrap().to_string()
}

/// Run the pipeline built from `config` over `text` without external tools
pub fn run_pipeline(text: &str, config: &FormatOnSaveConfig) -> (MemoryBuffer, PipelineReport) {
    run_pipeline_with(text, config, &Document::new("test.cs"), &mut NoTools)
}

pub fn run_pipeline_with(
    text: &str,
    config: &FormatOnSaveConfig,
    document: &Document,
    tools: &mut dyn ExternalTool,
) -> (MemoryBuffer, PipelineReport) {
    let pipeline = Pipeline::from_config(config).unwrap();
    let mut buffer = MemoryBuffer::new(text);
    let report = pipeline.run(document, &mut buffer, tools);
    (buffer, report)
}

/// Options with both external tool steps turned on
pub fn config_with_tools() -> FormatOnSaveConfig {
    FormatOnSaveConfig {
        enable_sort_tool: true,
        enable_format_tool: true,
        ..FormatOnSaveConfig::default()
    }
}

/// Scripted tool: records invocations and performs a canned action
#[derive(Default)]
pub struct MockTool {
    pub calls: Vec<ToolCommand>,
    /// Commands that fail with `ToolError::Failed`
    pub failing: Vec<ToolCommand>,
    /// Text the format command replaces the buffer with
    pub format_output: Option<String>,
}

impl MockTool {
    pub fn failing(commands: &[ToolCommand]) -> Self {
        Self {
            failing: commands.to_vec(),
            ..Self::default()
        }
    }

    pub fn formatting_to(output: &str) -> Self {
        Self {
            format_output: Some(output.to_string()),
            ..Self::default()
        }
    }
}

impl ExternalTool for MockTool {
    fn invoke(
        &mut self,
        command: ToolCommand,
        _document: &Document,
        buffer: &mut dyn BufferAccess,
    ) -> Result<(), ToolError> {
        self.calls.push(command);
        if self.failing.contains(&command) {
            return Err(ToolError::Failed(format!("{} crashed", command)));
        }
        if command == ToolCommand::FormatDocument {
            if let Some(output) = &self.format_output {
                let snapshot = buffer.snapshot();
                let mut batch = snapshot.edit();
                batch.replace(0, snapshot.len_chars(), output.clone());
                buffer
                    .apply(&batch)
                    .map_err(|e| ToolError::Failed(e.to_string()))?;
            }
        }
        Ok(())
    }
}
