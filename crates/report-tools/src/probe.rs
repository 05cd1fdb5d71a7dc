//! Check that the configured programs are installed.

use std::path::{Path, PathBuf};
use std::process::Command;

use report_core::error::{ReportError, Result};
use report_core::options::ReportOptions;

/// Locate `program` on `PATH` with `which`. Paths containing a separator are checked directly.
pub fn check_tool(program: &str) -> Result<PathBuf> {
    if program.contains(std::path::MAIN_SEPARATOR) {
        let path = Path::new(program);
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(ReportError::ToolNotFound(program.to_string()))
        };
    }

    let which = Command::new("which")
        .arg(program)
        .output()
        .map_err(|e| ReportError::Other(format!("Failed to check for {}: {}", program, e)))?;

    if !which.status.success() {
        return Err(ReportError::ToolNotFound(program.to_string()));
    }

    let found = String::from_utf8_lossy(&which.stdout).trim().to_string();
    Ok(PathBuf::from(found))
}

/// Result of probing one configured tool.
#[derive(Debug)]
pub struct ToolStatus {
    /// Role of the tool in the pipeline.
    pub role: &'static str,
    pub program: String,
    pub location: Option<PathBuf>,
}

/// Probe both configured tools.
pub fn check_tools(options: &ReportOptions) -> Vec<ToolStatus> {
    [
        ("text filter", &options.text_filter.program),
        ("merge tool", &options.merge_tool.program),
    ]
    .into_iter()
    .map(|(role, program)| {
        let location = match check_tool(program) {
            Ok(path) => Some(path),
            Err(e) => {
                log::debug!("{}: {}", role, e);
                None
            }
        };
        ToolStatus {
            role,
            program: program.clone(),
            location,
        }
    })
    .collect()
}
