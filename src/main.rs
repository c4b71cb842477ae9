use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use format_on_save::buffer::MemoryBuffer;
use format_on_save::cli::{CliArgs, FileSummary, RunOptions};
use format_on_save::config::FormatOnSaveConfig;
use format_on_save::pipeline::Pipeline;
use format_on_save::source::{DocumentSource, FileDocumentSource};
use format_on_save::tools::CommandTool;

fn main() -> Result<ExitCode> {
    let options = CliArgs::parse()
        .into_options()
        .map_err(|e| anyhow::anyhow!(e))?;

    format_on_save::tracing::init(options.log_level);

    let mut config = match &options.config_path {
        Some(path) => FormatOnSaveConfig::load_from(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => FormatOnSaveConfig::load(),
    };
    options.overrides.apply(&mut config);

    let pipeline = Pipeline::from_config(&config).context("Invalid filter in options")?;
    let source = FileDocumentSource::new(&config);
    let mut tools = CommandTool::new(config.tools.clone());

    let mut summaries = Vec::with_capacity(options.paths.len());
    for path in &options.paths {
        if let Some(summary) = process_file(path, &options, &pipeline, &source, &mut tools)? {
            if !options.json {
                println!("{}", summary.describe());
            }
            summaries.push(summary);
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }

    let any_changed = summaries.iter().any(|s| s.changed);
    if options.check && any_changed {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Normalize one file. Returns `None` for paths that are not text documents.
fn process_file(
    path: &Path,
    options: &RunOptions,
    pipeline: &Pipeline,
    source: &FileDocumentSource,
    tools: &mut CommandTool,
) -> Result<Option<FileSummary>> {
    let Some(document) = source.resolve(path) else {
        eprintln!("Skipping {}", path.display());
        return Ok(None);
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            eprintln!("Skipping {}: not UTF-8", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let mut buffer = MemoryBuffer::new(&text);
    let report = pipeline.run(&document, &mut buffer, tools);

    if report.committed && !options.check {
        std::fs::write(path, buffer.text())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(Some(FileSummary::from_report(path, &report)))
}
