//! Traits for the external tools the pipeline drives.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Progress reporter callback type.
pub type ProgressReporter = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Renders one plain-text file into a PDF.
pub trait TextFilter: Send + Sync {
    /// Human-readable name of this filter.
    fn name(&self) -> &str;

    /// Render `input` into `output`.
    ///
    /// On failure no partial `output` is left behind.
    fn render(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Composites several PDF/image inputs into one PDF.
pub trait MergeTool: Send + Sync {
    /// Human-readable name of this tool.
    fn name(&self) -> &str;

    /// Merge `inputs`, in order, into `output`. An existing `output` is replaced.
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}
