use std::path::PathBuf;
use thiserror::Error;

use super::operations::{same_path, FileOpError};

/// Invalid parameters or a missing input directory.
///
/// Always raised before anything on disk is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {name} ratio {value}: must be a finite number >= 0")]
    InvalidRatio { name: &'static str, value: f64 },
    #[error("Invalid ratios: train ({train}) + valid ({valid}) must be < 1 so the test subset is not empty")]
    RatioSumTooLarge { train: f64, valid: f64 },
    #[error("Required directory does not exist: {path}")]
    MissingDirectory { path: PathBuf },
    #[error("Expected a directory but found a file: {path}")]
    NotADirectory { path: PathBuf },
    #[error("Path does not exist: {path}")]
    MissingPath { path: PathBuf },
    #[error("Source and target class are both {class}; nothing to fix")]
    SameClass { class: u32 },
    #[error("{count} file name(s) appear in more than one merge source, first: {first}")]
    MergeCollision { count: usize, first: String },
    #[error("Output folder {output} is the input folder {input}; files would be copied onto themselves")]
    OverlappingPaths { input: PathBuf, output: PathBuf },
}

/// Fatal error of a whole operation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] FileOpError),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Checks that `path` exists and is a directory.
pub fn require_dir(path: &std::path::Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingDirectory {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Fails when `output` resolves to the same folder as `input`.
pub fn reject_overlap(
    input: &std::path::Path,
    output: &std::path::Path,
) -> Result<(), ConfigError> {
    if same_path(input, output) {
        return Err(ConfigError::OverlappingPaths {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_dir_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            require_dir(&missing),
            Err(ConfigError::MissingDirectory { .. })
        ));
    }

    #[test]
    fn test_require_dir_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            require_dir(&file),
            Err(ConfigError::NotADirectory { .. })
        ));
        assert!(require_dir(dir.path()).is_ok());
    }

    #[test]
    fn test_collision_message_names_first_file() {
        let err = ConfigError::MergeCollision {
            count: 2,
            first: "im1.jpg".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "2 file name(s) appear in more than one merge source, first: im1.jpg"
        );
    }
}
