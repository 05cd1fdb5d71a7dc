//! Process-backed implementations of the report tool traits.
//!
//! The text filter defaults to `cupsfilter` and the merge tool to
//! ImageMagick's `convert`; both are configurable through [`ReportOptions`].

pub mod filter;
pub mod merge;
pub mod probe;

use std::io::ErrorKind;
use std::path::Path;

use report_core::error::Result;
use report_core::options::ReportOptions;
use report_core::plugin::{MergeTool, TextFilter};

pub use filter::CommandTextFilter;
pub use merge::CommandMergeTool;

/// Build the configured filter and merge tool.
pub fn tools_from_options(options: &ReportOptions) -> (Box<dyn TextFilter>, Box<dyn MergeTool>) {
    (
        Box::new(CommandTextFilter::new(options.text_filter.clone())),
        Box::new(CommandMergeTool::new(options.merge_tool.clone())),
    )
}

/// Delete a previous `output` so a tool that exits 0 without writing is caught.
pub(crate) fn remove_previous_output(output: &Path) -> Result<()> {
    match std::fs::remove_file(output) {
        Ok(()) => {
            log::debug!("Removed previous {}", output.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
