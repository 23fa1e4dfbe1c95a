use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::dataset::remap_class;
use crate::core::error::{require_dir, ConfigError, ToolResult};
use crate::core::operations::{has_extension, list_files, FileOpError, FileOpResult};
use crate::core::progress::ProgressReporter;
use crate::core::report::{FailureLog, FileFailure, Warning};

#[derive(Debug, Clone)]
pub struct FixLabelsConfig {
    pub labels_dir: PathBuf,
    pub from_class: u32,
    pub to_class: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FixLabelsReport {
    pub labels_dir: PathBuf,
    pub from_class: u32,
    pub to_class: u32,
    pub files_scanned: usize,
    pub files_modified: usize,
    pub lines_changed: usize,
    pub warnings: Vec<Warning>,
    pub failures: Vec<FileFailure>,
}

impl FixLabelsReport {
    pub fn files_unchanged(&self) -> usize {
        self.files_scanned - self.files_modified - self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Rewrite every `*.txt` label in `labels_dir`, turning class `from_class`
/// into `to_class`. Files without a matching line are left untouched.
pub fn fix_label_classes(
    config: &FixLabelsConfig,
    progress: &mut dyn ProgressReporter,
) -> ToolResult<FixLabelsReport> {
    if config.from_class == config.to_class {
        return Err(ConfigError::SameClass {
            class: config.from_class,
        }
        .into());
    }
    require_dir(&config.labels_dir)?;

    info!(
        "Processing folder {:?}: class {} -> {}",
        config.labels_dir, config.from_class, config.to_class
    );

    let label_files: Vec<PathBuf> = list_files(&config.labels_dir)?
        .into_iter()
        .filter(|p| has_extension(p, &["txt"]))
        .collect();
    let total = label_files.len();

    let mut warnings = Vec::new();
    if total == 0 {
        warn!("No .txt files found in {:?}", config.labels_dir);
        warnings.push(Warning::EmptyInput {
            path: config.labels_dir.clone(),
        });
    } else {
        info!("Found {} .txt files", total);
    }

    let mut failures = FailureLog::default();
    let mut files_modified = 0;
    let mut lines_changed = 0;

    for (idx, path) in label_files.iter().enumerate() {
        match failures.record(fix_file(path, config.from_class, config.to_class)) {
            Some(0) => debug!("Skipped {:?} (no changes needed)", path),
            Some(changed) => {
                info!("Modified {:?} ({} lines changed)", path, changed);
                files_modified += 1;
                lines_changed += changed;
            }
            None => {}
        }
        progress.report(idx + 1, total);
    }

    info!(
        "Label fix complete: {} processed, {} modified, {} failed",
        total,
        files_modified,
        failures.len()
    );

    Ok(FixLabelsReport {
        labels_dir: config.labels_dir.clone(),
        from_class: config.from_class,
        to_class: config.to_class,
        files_scanned: total,
        files_modified,
        lines_changed,
        warnings,
        failures: failures.failures,
    })
}

fn fix_file(path: &Path, from: u32, to: u32) -> FileOpResult<usize> {
    let content = fs::read_to_string(path).map_err(|e| FileOpError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (rewritten, changed) = remap_class(&content, from, to);
    if changed > 0 {
        fs::write(path, rewritten).map_err(|e| FileOpError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(changed)
}
