//! Text→PDF rendering through an external filter such as `cupsfilter`.
//!
//! The filter's diagnostics are discarded; a failure only surfaces as an `Err`
//! the pipeline logs at debug level.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

use report_core::error::{ReportError, Result};
use report_core::options::{FilterOutput, ToolCommand};
use report_core::plugin::TextFilter;

pub struct CommandTextFilter {
    command: ToolCommand,
}

impl CommandTextFilter {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }

    fn run(&self, input: &Path, output: &Path) -> Result<()> {
        let (args, mode) = self.command.filter_args(input, output);
        crate::remove_previous_output(output)?;

        let mut cmd = Command::new(&self.command.program);
        cmd.args(&args).stdin(Stdio::null()).stderr(Stdio::null());
        match mode {
            FilterOutput::Stdout => {
                let file = File::create(output)?;
                cmd.stdout(file);
            }
            FilterOutput::Argument => {
                cmd.stdout(Stdio::null());
            }
        }

        log::debug!("Running {} on {}", self.command.program, input.display());

        let status = cmd.status().map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReportError::ToolNotFound(self.command.program.clone()),
            _ => ReportError::Tool {
                tool: self.command.program.clone(),
                message: format!("cannot start: {}", e),
            },
        })?;

        if !status.success() {
            return Err(ReportError::Tool {
                tool: self.command.program.clone(),
                message: format!("{} on {}", status, input.display()),
            });
        }
        if !output.is_file() {
            return Err(ReportError::Tool {
                tool: self.command.program.clone(),
                message: format!("no output written to {}", output.display()),
            });
        }
        Ok(())
    }
}

impl TextFilter for CommandTextFilter {
    fn name(&self) -> &str {
        &self.command.program
    }

    fn render(&self, input: &Path, output: &Path) -> Result<()> {
        let result = self.run(input, output);
        if result.is_err() {
            // Drop whatever the redirect or the tool left behind
            std::fs::remove_file(output).ok();
        }
        result
    }
}
