use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::error::{require_dir, ConfigError};

/// One of the three partitions of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    Train,
    Valid,
    Test,
}

impl Subset {
    /// Traversal order used by split and merge.
    pub const ALL: [Subset; 3] = [Subset::Train, Subset::Valid, Subset::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Valid => "valid",
            Subset::Test => "test",
        }
    }
}

impl std::fmt::Display for Subset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two children of a dataset directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Images,
    Labels,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Images, ArtifactKind::Labels];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Images => "images",
            ArtifactKind::Labels => "labels",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directory holding `images/` and `labels/`.
#[derive(Debug, Clone)]
pub struct DatasetDir {
    root: PathBuf,
}

impl DatasetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open an existing dataset, requiring both children to be directories.
    pub fn open_existing(root: &Path) -> Result<Self, ConfigError> {
        let dataset = Self::new(root);
        require_dir(&dataset.images_dir())?;
        require_dir(&dataset.labels_dir())?;
        Ok(dataset)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn child(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.as_str())
    }

    pub fn images_dir(&self) -> PathBuf {
        self.child(ArtifactKind::Images)
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.child(ArtifactKind::Labels)
    }

    /// `<root>/<subset>` as a dataset of its own.
    pub fn subset(&self, subset: Subset) -> DatasetDir {
        DatasetDir::new(self.root.join(subset.as_str()))
    }
}
