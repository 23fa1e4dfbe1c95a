use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use super::dataset::{ArtifactKind, Subset};
use super::operations::{FileOpError, FileOpResult};

/// A file that could not be processed. The operation carried on without it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub operation: &'static str,
    pub message: String,
}

impl From<&FileOpError> for FileFailure {
    fn from(error: &FileOpError) -> Self {
        Self {
            path: error.path().to_path_buf(),
            operation: error.operation(),
            message: error.to_string(),
        }
    }
}

/// Non-fatal conditions worth telling the user about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    /// Nothing to process; output structure was still created.
    EmptyInput { path: PathBuf },
    /// A merge source has no `images` or `labels` child.
    MissingSubfolder { subset: Subset, kind: ArtifactKind },
    /// The same file name came from more than one merge source.
    Collision {
        name: String,
        kind: ArtifactKind,
        overwritten_by: Subset,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::EmptyInput { path } => write!(f, "no input files found in {}", path.display()),
            Warning::MissingSubfolder { subset, kind } => {
                write!(f, "missing {} folder in {}", kind, subset)
            }
            Warning::Collision {
                name,
                kind,
                overwritten_by,
            } => write!(f, "{}/{} overwritten by {}", kind, name, overwritten_by),
        }
    }
}

/// Collects per-file failures so a single bad file never aborts a run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FailureLog {
    pub failures: Vec<FileFailure>,
}

impl FailureLog {
    /// Record the error if there is one and hand back the success value.
    pub fn record<T>(&mut self, result: FileOpResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping {:?} after failed {}: {}", e.path(), e.operation(), e);
                self.failures.push(FileFailure::from(&e));
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operations::copy_into_dir;

    #[test]
    fn test_failure_log_records_errors_and_passes_values() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        std::fs::write(&good, "ok").unwrap();
        let missing = dir.path().join("missing.txt");

        let mut log = FailureLog::default();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let copied = log.record(copy_into_dir(&good, &out));
        assert_eq!(copied, Some(out.join("good.txt")));
        assert_eq!(log.len(), 0);

        let result = log.record(copy_into_dir(&missing, &out));
        assert!(result.is_none());
        assert_eq!(log.len(), 1);
        assert_eq!(log.failures[0].path, missing);
        assert_eq!(log.failures[0].operation, "copy");
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::MissingSubfolder {
            subset: Subset::Valid,
            kind: ArtifactKind::Labels,
        };
        assert_eq!(warning.to_string(), "missing labels folder in valid");
    }
}
