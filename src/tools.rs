//! External tools - opaque sort/format commands run during a save
//!
//! The pipeline never looks at what a tool did; it only branches on whether
//! the invocation succeeded. A tool is free to edit the buffer through the
//! [`BufferAccess`] it is handed.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::buffer::BufferAccess;
use crate::model::Document;

/// Commands the pipeline can ask a tool to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCommand {
    /// Sort and remove unused imports/usings
    SortImports,
    /// Reformat the whole document
    FormatDocument,
}

impl ToolCommand {
    pub fn id(&self) -> &'static str {
        match self {
            ToolCommand::SortImports => "sort",
            ToolCommand::FormatDocument => "format",
        }
    }
}

impl std::fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Why a tool invocation did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// No tool is available for the command
    Unavailable(String),
    /// The tool ran and failed
    Failed(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Unavailable(msg) => write!(f, "Tool unavailable: {}", msg),
            ToolError::Failed(msg) => write!(f, "Tool failed: {}", msg),
        }
    }
}

impl std::error::Error for ToolError {}

/// A synchronous, side-effecting external tool
pub trait ExternalTool {
    fn invoke(
        &mut self,
        command: ToolCommand,
        document: &Document,
        buffer: &mut dyn BufferAccess,
    ) -> Result<(), ToolError>;
}

/// Host without any external tools
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTools;

impl ExternalTool for NoTools {
    fn invoke(
        &mut self,
        command: ToolCommand,
        _document: &Document,
        _buffer: &mut dyn BufferAccess,
    ) -> Result<(), ToolError> {
        Err(ToolError::Unavailable(format!(
            "no tool registered for '{}'",
            command
        )))
    }
}

/// A program invocation as written in the options file
///
/// `{path}` in an argument is replaced by the document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Programs configured per tool command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub sort: Option<CommandSpec>,
    #[serde(default)]
    pub format: Option<CommandSpec>,
}

/// Runs configured programs as filters: the buffer text goes to stdin and
/// stdout replaces the buffer when the program exits successfully.
#[derive(Debug, Clone, Default)]
pub struct CommandTool {
    config: ToolsConfig,
}

impl CommandTool {
    pub fn new(config: ToolsConfig) -> Self {
        Self { config }
    }

    fn spec(&self, command: ToolCommand) -> Option<&CommandSpec> {
        match command {
            ToolCommand::SortImports => self.config.sort.as_ref(),
            ToolCommand::FormatDocument => self.config.format.as_ref(),
        }
    }
}

impl ExternalTool for CommandTool {
    fn invoke(
        &mut self,
        command: ToolCommand,
        document: &Document,
        buffer: &mut dyn BufferAccess,
    ) -> Result<(), ToolError> {
        let spec = self.spec(command).ok_or_else(|| {
            ToolError::Unavailable(format!("no program configured for '{}'", command))
        })?;

        let snapshot = buffer.snapshot();
        let input = snapshot.to_string();
        let output = run_filter(spec, document, input.clone())?;
        if output == input {
            return Ok(());
        }

        let mut batch = snapshot.edit();
        batch.replace(0, snapshot.len_chars(), output);
        buffer
            .apply(&batch)
            .map(|_| ())
            .map_err(|e| ToolError::Failed(e.to_string()))
    }
}

fn run_filter(spec: &CommandSpec, document: &Document, input: String) -> Result<String, ToolError> {
    let path = document.path.to_string_lossy();
    let args: Vec<String> = spec
        .args
        .iter()
        .map(|arg| arg.replace("{path}", &path))
        .collect();

    tracing::debug!("Running {} {:?}", spec.program, args);

    let mut child = Command::new(&spec.program)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                ToolError::Unavailable(format!("{}: program not found", spec.program))
            }
            _ => ToolError::Failed(format!("{}: {}", spec.program, e)),
        })?;

    // Feed stdin from another thread so a chatty child cannot deadlock us
    let writer = child.stdin.take().map(|mut stdin| {
        std::thread::spawn(move || stdin.write_all(input.as_bytes()))
    });

    let output = child
        .wait_with_output()
        .map_err(|e| ToolError::Failed(format!("{}: {}", spec.program, e)))?;

    if let Some(handle) = writer {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => {
                return Err(ToolError::Failed(format!("{}: {}", spec.program, e)));
            }
            Err(_) => {
                return Err(ToolError::Failed(format!(
                    "{}: stdin writer panicked",
                    spec.program
                )));
            }
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::Failed(format!(
            "{} exited with {}: {}",
            spec.program,
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| ToolError::Failed(format!("{}: output is not UTF-8", spec.program)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;

    fn spec(program: &str, args: &[&str]) -> Option<CommandSpec> {
        Some(CommandSpec {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[test]
    fn test_no_tools_is_unavailable() {
        let mut buffer = MemoryBuffer::new("x");
        let result = NoTools.invoke(
            ToolCommand::FormatDocument,
            &Document::new("a.cs"),
            &mut buffer,
        );
        assert!(matches!(result, Err(ToolError::Unavailable(_))));
    }

    #[test]
    fn test_unconfigured_command_is_unavailable() {
        let mut tool = CommandTool::new(ToolsConfig {
            sort: None,
            format: spec("cat", &[]),
        });
        let mut buffer = MemoryBuffer::new("x");
        let result = tool.invoke(ToolCommand::SortImports, &Document::new("a.cs"), &mut buffer);
        assert!(matches!(result, Err(ToolError::Unavailable(_))));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let mut tool = CommandTool::new(ToolsConfig {
            sort: None,
            format: spec("definitely-not-a-real-formatter-binary", &[]),
        });
        let mut buffer = MemoryBuffer::new("x");
        let result = tool.invoke(
            ToolCommand::FormatDocument,
            &Document::new("a.cs"),
            &mut buffer,
        );
        assert!(matches!(result, Err(ToolError::Unavailable(_))));
        assert_eq!(buffer.text(), "x");
    }

    #[cfg(unix)]
    #[test]
    fn test_identity_filter_leaves_buffer_alone() {
        let mut tool = CommandTool::new(ToolsConfig {
            sort: None,
            format: spec("cat", &[]),
        });
        let mut buffer = MemoryBuffer::new("hello\n");
        tool.invoke(
            ToolCommand::FormatDocument,
            &Document::new("a.txt"),
            &mut buffer,
        )
        .unwrap();
        assert_eq!(buffer.text(), "hello\n");
        assert_eq!(buffer.version(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_filter_output_replaces_buffer() {
        let mut tool = CommandTool::new(ToolsConfig {
            sort: spec("sort", &[]),
            format: None,
        });
        let mut buffer = MemoryBuffer::new("b\na\n");
        tool.invoke(ToolCommand::SortImports, &Document::new("a.txt"), &mut buffer)
            .unwrap();
        assert_eq!(buffer.text(), "a\nb\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_path_placeholder() {
        let mut tool = CommandTool::new(ToolsConfig {
            sort: None,
            format: spec("echo", &["{path}"]),
        });
        let mut buffer = MemoryBuffer::new("");
        tool.invoke(
            ToolCommand::FormatDocument,
            &Document::new("/tmp/doc.cs"),
            &mut buffer,
        )
        .unwrap();
        assert_eq!(buffer.text(), "/tmp/doc.cs\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_is_failed() {
        let mut tool = CommandTool::new(ToolsConfig {
            sort: None,
            format: spec("false", &[]),
        });
        let mut buffer = MemoryBuffer::new("keep");
        let result = tool.invoke(
            ToolCommand::FormatDocument,
            &Document::new("a.cs"),
            &mut buffer,
        );
        assert!(matches!(result, Err(ToolError::Failed(_))));
        assert_eq!(buffer.text(), "keep");
    }
}
