//! Final assembly through an external converter, ImageMagick `convert` by default.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use report_core::error::{ReportError, Result};
use report_core::options::ToolCommand;
use report_core::plugin::MergeTool;

/// Longest stderr excerpt carried in an error.
const STDERR_EXCERPT: usize = 512;

pub struct CommandMergeTool {
    command: ToolCommand,
}

impl CommandMergeTool {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

impl MergeTool for CommandMergeTool {
    fn name(&self) -> &str {
        &self.command.program
    }

    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let args = self.command.merge_args(inputs, output);
        crate::remove_previous_output(output)?;

        log::info!(
            "Running {} with {} inputs -> {}",
            self.command.program,
            inputs.len(),
            output.display()
        );

        let result = Command::new(&self.command.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ReportError::ToolNotFound(self.command.program.clone()),
                _ => ReportError::Tool {
                    tool: self.command.program.clone(),
                    message: format!("cannot start: {}", e),
                },
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ReportError::Tool {
                tool: self.command.program.clone(),
                message: format!("{}: {}", result.status, excerpt(stderr.trim())),
            });
        }
        if !output.is_file() {
            return Err(ReportError::Tool {
                tool: self.command.program.clone(),
                message: format!("no report written to {}", output.display()),
            });
        }
        Ok(())
    }
}

fn excerpt(s: &str) -> &str {
    if s.len() <= STDERR_EXCERPT {
        return s;
    }
    let mut end = STDERR_EXCERPT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
