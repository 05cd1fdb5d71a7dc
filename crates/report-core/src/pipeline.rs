//! Report pipeline: convert the text statistics, merge them with the plots,
//! remove the intermediates.
//!
//! Every step is best-effort. A failed conversion drops that page, a failed
//! merge leaves no report, and cleanup runs in every case.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{ReportError, Result};
use crate::layout;
use crate::options::ReportOptions;
use crate::plugin::{MergeTool, ProgressReporter, TextFilter};

/// What a single run produced.
#[derive(Debug, Default)]
pub struct ReportOutcome {
    /// Intermediate PDFs rendered by the filter, in merge order.
    pub converted: Vec<PathBuf>,
    /// Text inputs the filter could not render, with the reason.
    pub failed: Vec<(String, String)>,
    /// Everything handed to the merge tool, in order.
    pub merge_inputs: Vec<PathBuf>,
    /// The written report, if the merge succeeded.
    pub report: Option<PathBuf>,
    pub merge_error: Option<String>,
    /// Intermediates deleted during cleanup.
    pub removed: Vec<PathBuf>,
}

impl ReportOutcome {
    pub fn succeeded(&self) -> bool {
        self.report.is_some()
    }
}

/// The report pipeline orchestrator.
pub struct ReportPipeline {
    filter: Box<dyn TextFilter>,
    merger: Box<dyn MergeTool>,
    progress_reporter: Option<ProgressReporter>,
}

impl ReportPipeline {
    pub fn new(filter: Box<dyn TextFilter>, merger: Box<dyn MergeTool>) -> Self {
        Self {
            filter,
            merger,
            progress_reporter: None,
        }
    }

    /// Set a progress reporter callback.
    pub fn set_progress_reporter(&mut self, reporter: ProgressReporter) {
        self.progress_reporter = Some(reporter);
    }

    /// Build the report for `dir`.
    pub fn run(&self, dir: &Path, options: &ReportOptions) -> ReportOutcome {
        let mut outcome = ReportOutcome::default();
        self.report_progress(0.0, "Starting report...");

        // Step 1: convert
        let names = text_inputs(dir, options);
        for (idx, name) in names.iter().enumerate() {
            let progress = 0.6 * idx as f64 / names.len().max(1) as f64;
            self.report_progress(progress, &format!("Converting {}", name));

            let input = dir.join(name);
            let output = layout::intermediate_path(dir, name);
            match self.filter.render(&input, &output) {
                Ok(()) => {
                    info!("Converted {}", input.display());
                    outcome.converted.push(output);
                }
                Err(e) => {
                    debug!("{} skipped {}: {}", self.filter.name(), input.display(), e);
                    outcome.failed.push((name.clone(), e.to_string()));
                }
            }
        }

        // Step 2: merge
        self.report_progress(0.6, &format!("Running {}", self.merger.name()));
        match self.merge(dir, options, &mut outcome) {
            Ok(report) => {
                info!("Report written to {}", report.display());
                outcome.report = Some(report);
            }
            Err(e) => {
                warn!("Merge failed: {}", e);
                outcome.merge_error = Some(e.to_string());
            }
        }

        // Step 3: cleanup, regardless of the merge result
        self.report_progress(0.9, "Removing intermediate files");
        outcome.removed = remove_intermediates(dir);

        self.report_progress(1.0, "Report complete");
        outcome
    }

    fn merge(
        &self,
        dir: &Path,
        options: &ReportOptions,
        outcome: &mut ReportOutcome,
    ) -> Result<PathBuf> {
        let report = layout::report_path(dir)?;

        let mut inputs: Vec<PathBuf> = outcome
            .converted
            .iter()
            .filter(|p| p.is_file())
            .cloned()
            .collect();
        match layout::find_images(dir, &options.image_extension) {
            Ok(images) => inputs.extend(images),
            Err(e) => warn!("Cannot list images in {}: {}", dir.display(), e),
        }
        outcome.merge_inputs = inputs.clone();

        if inputs.is_empty() {
            return Err(ReportError::Pipeline(format!(
                "nothing to merge in {}",
                dir.display()
            )));
        }

        info!(
            "Running {} on {} inputs...",
            self.merger.name(),
            inputs.len()
        );
        self.merger.merge(&inputs, &report)?;
        Ok(report)
    }

    fn report_progress(&self, fraction: f64, message: &str) {
        if let Some(ref reporter) = self.progress_reporter {
            reporter(fraction, message);
        }
    }
}

/// Text files to convert: the required ones, then optional ones that exist.
fn text_inputs(dir: &Path, options: &ReportOptions) -> Vec<String> {
    let mut names: Vec<String> = options
        .required_text_inputs()
        .map(str::to_string)
        .collect();
    for name in options.optional_text_inputs() {
        if names.iter().any(|n| n.as_str() == *name) {
            continue;
        }
        if dir.join(name).is_file() {
            names.push(name.to_string());
        }
    }
    names
}

/// Delete every `*.txt.pdf` in `dir`. Failures are logged and skipped.
pub fn remove_intermediates(dir: &Path) -> Vec<PathBuf> {
    let found = match layout::find_intermediates(dir) {
        Ok(found) => found,
        Err(e) => {
            warn!("Cannot list {} for cleanup: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut removed = Vec::with_capacity(found.len());
    for path in found {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                removed.push(path);
            }
            Err(e) => warn!("Cannot remove {}: {}", path.display(), e),
        }
    }
    removed
}

/// Builder for constructing a report pipeline.
pub struct PipelineBuilder {
    filter: Option<Box<dyn TextFilter>>,
    merger: Option<Box<dyn MergeTool>>,
    progress_reporter: Option<ProgressReporter>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            filter: None,
            merger: None,
            progress_reporter: None,
        }
    }

    pub fn filter(mut self, filter: Box<dyn TextFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn merger(mut self, merger: Box<dyn MergeTool>) -> Self {
        self.merger = Some(merger);
        self
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<ReportPipeline> {
        let filter = self
            .filter
            .ok_or_else(|| ReportError::Pipeline("No text filter specified".to_string()))?;
        let merger = self
            .merger
            .ok_or_else(|| ReportError::Pipeline("No merge tool specified".to_string()))?;

        let mut pipeline = ReportPipeline::new(filter, merger);
        if let Some(reporter) = self.progress_reporter {
            pipeline.set_progress_reporter(reporter);
        }
        Ok(pipeline)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
