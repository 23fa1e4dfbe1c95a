use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Result type for file operations
pub type FileOpResult<T> = Result<T, FileOpError>;

/// A single file-level failure. Callers record these and move on.
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("Copy failed from {src} to {dest}: {source}")]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },
    #[error("Remove failed for {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read directory {path}: {source}")]
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Image error for {path}: {source}")]
    ImageFailed {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl FileOpError {
    /// Path of the file the failed operation was acting on.
    pub fn path(&self) -> &Path {
        match self {
            FileOpError::CopyFailed { src, .. } => src,
            FileOpError::RemoveFailed { path, .. }
            | FileOpError::ReadDirFailed { path, .. }
            | FileOpError::CreateDirFailed { path, .. }
            | FileOpError::ReadFailed { path, .. }
            | FileOpError::WriteFailed { path, .. }
            | FileOpError::ImageFailed { path, .. } => path,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            FileOpError::CopyFailed { .. } => "copy",
            FileOpError::RemoveFailed { .. } => "delete",
            FileOpError::ReadDirFailed { .. } => "read-dir",
            FileOpError::CreateDirFailed { .. } => "create-dir",
            FileOpError::ReadFailed { .. } => "read",
            FileOpError::WriteFailed { .. } => "write",
            FileOpError::ImageFailed { .. } => "image",
        }
    }
}

/// Copy a file, overwriting `dest` if it already exists.
///
/// # Returns
/// * `Ok(bytes)` number of bytes copied
/// * `Err(FileOpError::CopyFailed)` if the copy failed or `src` and `dest`
///   are the same file
pub fn copy_file(src: &Path, dest: &Path) -> FileOpResult<u64> {
    debug!("Copying {:?} -> {:?}", src, dest);
    if same_path(src, dest) {
        error!("Refusing to copy {:?} onto itself", src);
        return Err(FileOpError::CopyFailed {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "source and destination are the same file",
            ),
        });
    }
    fs::copy(src, dest).map_err(|e| {
        error!("Failed to copy file from {:?} to {:?}: {}", src, dest, e);
        FileOpError::CopyFailed {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            source: e,
        }
    })
}

/// Copy a file into `dir`, keeping its file name. Returns the new path.
pub fn copy_into_dir(src: &Path, dir: &Path) -> FileOpResult<PathBuf> {
    let dest = match src.file_name() {
        Some(name) => dir.join(name),
        None => {
            return Err(FileOpError::CopyFailed {
                src: src.to_path_buf(),
                dest: dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "source path has no file name",
                ),
            })
        }
    };
    copy_file(src, &dest)?;
    Ok(dest)
}

pub fn remove_file(path: &Path) -> FileOpResult<()> {
    debug!("Removing {:?}", path);
    fs::remove_file(path).map_err(|e| {
        error!("Failed to remove {:?}: {}", path, e);
        FileOpError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Create a directory and its parents. Existing directories are fine.
pub fn ensure_dir(path: &Path) -> FileOpResult<()> {
    fs::create_dir_all(path).map_err(|e| {
        error!("Failed to create directory {:?}: {}", path, e);
        FileOpError::CreateDirFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// List the regular files directly inside `dir`, sorted by path.
/// Subdirectories are skipped.
pub fn list_files(dir: &Path) -> FileOpResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| FileOpError::ReadDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FileOpError::ReadDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Whether both paths exist and resolve to the same location.
pub fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// File name without its extension, used to pair images with labels.
pub fn basename(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Lowercase extension check against a list like `["jpg", "png"]`.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.iter().any(|e| *e == ext)
        }
        None => false,
    }
}

/// Get the label path for an image: `<labels_dir>/<basename>.txt`.
pub fn label_path_for_image(labels_dir: &Path, image_path: &Path) -> Option<PathBuf> {
    basename(image_path).map(|stem| labels_dir.join(format!("{}.txt", stem)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dest = dir.path().join("b.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dest, "old").unwrap();

        copy_file(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_copy_file_onto_itself_fails_and_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        fs::write(&src, "keep me").unwrap();

        let err = copy_into_dir(&src, &dir.path().join(".")).unwrap_err();
        assert_eq!(err.operation(), "copy");
        assert_eq!(fs::read_to_string(&src).unwrap(), "keep me");
    }

    #[test]
    fn test_same_path_resolves_relative_segments() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("images")).unwrap();
        assert!(same_path(
            &dir.path().join("images"),
            &dir.path().join("images").join("..").join("images")
        ));
        assert!(!same_path(dir.path(), &dir.path().join("images")));
        assert!(!same_path(&dir.path().join("missing"), &dir.path().join("missing")));
    }

    #[test]
    fn test_copy_missing_source_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("missing.jpg");
        let err = copy_into_dir(&src, dir.path()).unwrap_err();
        assert_eq!(err.path(), src.as_path());
        assert_eq!(err.operation(), "copy");
    }

    #[test]
    fn test_list_files_skips_directories_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), "").unwrap();
        fs::write(dir.path().join("a.jpg"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_list_files_on_missing_dir_reports_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = list_files(&missing).unwrap_err();
        assert!(matches!(err, FileOpError::ReadDirFailed { .. }));
        assert_eq!(err.path(), missing.as_path());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("x").join("y");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_has_extension_is_case_insensitive() {
        assert!(has_extension(Path::new("IMG.JPG"), &["jpg", "png"]));
        assert!(!has_extension(Path::new("clip.mp4"), &["jpg", "png"]));
        assert!(!has_extension(Path::new("README"), &["jpg"]));
    }

    #[test]
    fn test_label_path_for_image() {
        let labels = Path::new("/data/labels");
        assert_eq!(
            label_path_for_image(labels, Path::new("/data/images/frame_01.png")),
            Some(PathBuf::from("/data/labels/frame_01.txt"))
        );
    }
}
