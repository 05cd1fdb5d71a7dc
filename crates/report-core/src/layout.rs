//! File naming rules of a statistics directory.
//!
//! The analyzer writes text statistics and SVG plots into `stats_<author>`;
//! the report lands next to them as `report-<basename>.pdf`.

use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Text files every statistics directory is expected to hold.
pub const DEFAULT_TEXT_INPUTS: &[&str] = &["fan_activity.txt", "stats_overall.txt"];

/// Secondary analyzer outputs, merged after the default inputs when present.
pub const EXTENDED_TEXT_INPUTS: &[&str] = &[
    "followers_most_active.txt",
    "domains_most_published.txt",
    "links_most_popular.txt",
    "posts_most_popular.txt",
    "cross_active_people.txt",
    "cross_active_likers.txt",
    "cross_active_sharers.txt",
    "cross_active_commenters.txt",
];

/// Suffix shared by every intermediate PDF.
pub const INTERMEDIATE_SUFFIX: &str = ".txt.pdf";

pub const REPORT_PREFIX: &str = "report-";

/// Intermediate PDF for a text file: `<dir>/<name>.pdf`.
pub fn intermediate_path(dir: &Path, text_name: &str) -> PathBuf {
    dir.join(format!("{}.pdf", text_name))
}

/// `report-<basename>.pdf`
pub fn report_file_name(basename: &str) -> String {
    format!("{}{}.pdf", REPORT_PREFIX, basename)
}

/// Basename of the symlink-resolved directory.
///
/// Falls back to the absolute, unresolved path when the directory cannot be
/// canonicalized, so a missing directory still yields a name.
pub fn resolve_basename(dir: &Path) -> Result<String> {
    let resolved = match dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Cannot resolve {}: {}", dir.display(), e);
            std::path::absolute(dir)?
        }
    };

    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ReportError::Pipeline(format!("{} has no directory name", resolved.display()))
        })
}

/// Full path of the report for `dir`.
pub fn report_path(dir: &Path) -> Result<PathBuf> {
    Ok(dir.join(report_file_name(&resolve_basename(dir)?)))
}

/// Dot files, which a shell glob such as `*.svg` never matches.
fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

/// Regular files in `dir` with the given extension, sorted by file name.
///
/// The match is case-sensitive and skips dot files, like a shell glob.
pub fn find_images(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| !is_hidden(&entry.file_name()))
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect();
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Every intermediate PDF currently in `dir`, including stale ones. Dot files are left alone.
pub fn find_intermediates(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| !is_hidden(&entry.file_name()))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(INTERMEDIATE_SUFFIX))
        })
        .map(|entry| entry.path())
        .collect();
    found.sort();
    Ok(found)
}
