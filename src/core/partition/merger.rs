//! Reunify train/valid/test partitions into one `images/` + `labels/` pair.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::dataset::{ArtifactKind, DatasetDir, Subset};
use crate::core::error::{reject_overlap, require_dir, ConfigError, ToolResult};
use crate::core::operations::{copy_into_dir, ensure_dir, list_files};
use crate::core::progress::ProgressReporter;
use crate::core::report::{FailureLog, FileFailure, Warning};

/// Behavior when two sources hold a file with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Later sources overwrite earlier ones (train, then valid, then test).
    #[default]
    Overwrite,
    /// Refuse to merge; nothing is written.
    Fail,
}

#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub train_dir: PathBuf,
    pub valid_dir: PathBuf,
    pub test_dir: PathBuf,
    pub root_dir: PathBuf,
    pub collision_policy: CollisionPolicy,
}

impl MergeConfig {
    pub fn new(
        train_dir: impl Into<PathBuf>,
        valid_dir: impl Into<PathBuf>,
        test_dir: impl Into<PathBuf>,
        root_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            train_dir: train_dir.into(),
            valid_dir: valid_dir.into(),
            test_dir: test_dir.into(),
            root_dir: root_dir.into(),
            collision_policy: CollisionPolicy::default(),
        }
    }

    /// Sources in traversal order.
    pub fn sources(&self) -> [(Subset, &Path); 3] {
        [
            (Subset::Train, self.train_dir.as_path()),
            (Subset::Valid, self.valid_dir.as_path()),
            (Subset::Test, self.test_dir.as_path()),
        ]
    }

    pub fn destination(&self, date: NaiveDate) -> PathBuf {
        self.root_dir.join(AppConfig::default().merged_dir_name(date))
    }
}

/// Files copied from one source child.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceTally {
    pub subset: Subset,
    pub kind: ArtifactKind,
    pub found: usize,
    pub copied: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub destination: PathBuf,
    pub tallies: Vec<SourceTally>,
    pub collisions: usize,
    pub warnings: Vec<Warning>,
    pub failures: Vec<FileFailure>,
}

impl MergeReport {
    pub fn tally(&self, subset: Subset, kind: ArtifactKind) -> Option<&SourceTally> {
        self.tallies
            .iter()
            .find(|t| t.subset == subset && t.kind == kind)
    }

    pub fn total_copied(&self) -> usize {
        self.tallies.iter().map(|t| t.copied).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

struct PendingCopy {
    subset: Subset,
    kind: ArtifactKind,
    path: PathBuf,
}

/// Merge into `<root>/merged_<today>` using the local calendar date.
pub fn merge_datasets(
    config: &MergeConfig,
    progress: &mut dyn ProgressReporter,
) -> ToolResult<MergeReport> {
    merge_datasets_on(config, chrono::Local::now().date_naive(), progress)
}

/// Merge into the destination named after `date`.
pub fn merge_datasets_on(
    config: &MergeConfig,
    date: NaiveDate,
    progress: &mut dyn ProgressReporter,
) -> ToolResult<MergeReport> {
    for (_, dir) in config.sources() {
        require_dir(dir)?;
    }
    require_dir(&config.root_dir)?;

    let destination = DatasetDir::new(config.destination(date));
    for (_, dir) in config.sources() {
        let source = DatasetDir::new(dir);
        for kind in ArtifactKind::ALL {
            reject_overlap(&source.child(kind), &destination.child(kind))?;
        }
    }

    info!("Starting dataset merge into {:?}", config.root_dir);

    let mut warnings = Vec::new();
    let mut failures = FailureLog::default();
    let mut tallies = Vec::new();
    let mut pending = Vec::new();

    for (subset, dir) in config.sources() {
        let source = DatasetDir::new(dir);
        for kind in ArtifactKind::ALL {
            let child = source.child(kind);
            let mut tally = SourceTally {
                subset,
                kind,
                found: 0,
                copied: 0,
            };
            if !child.is_dir() {
                warn!("Missing {} folder in {}: {:?}", kind, subset, child);
                warnings.push(Warning::MissingSubfolder { subset, kind });
                tallies.push(tally);
                continue;
            }
            if let Some(files) = failures.record(list_files(&child)) {
                tally.found = files.len();
                pending.extend(files.into_iter().map(|path| PendingCopy { subset, kind, path }));
            }
            tallies.push(tally);
        }
    }

    let collisions = find_collisions(&pending);
    if config.collision_policy == CollisionPolicy::Fail {
        if let Some(Warning::Collision { name, .. }) = collisions.first() {
            return Err(ConfigError::MergeCollision {
                count: collisions.len(),
                first: name.clone(),
            }
            .into());
        }
    }
    for collision in &collisions {
        warn!("Name collision, later source wins: {}", collision);
    }
    let collision_count = collisions.len();
    warnings.extend(collisions);

    ensure_dir(&destination.images_dir())?;
    ensure_dir(&destination.labels_dir())?;

    let total = pending.len();
    info!("Found {} total files to merge", total);
    if total == 0 {
        warnings.push(Warning::EmptyInput {
            path: config.root_dir.clone(),
        });
    }

    for (idx, file) in pending.iter().enumerate() {
        let target = destination.child(file.kind);
        if failures.record(copy_into_dir(&file.path, &target)).is_some() {
            if let Some(tally) = tallies
                .iter_mut()
                .find(|t| t.subset == file.subset && t.kind == file.kind)
            {
                tally.copied += 1;
            }
        }
        progress.report(idx + 1, total);
    }

    info!(
        "Merge complete: {} file(s) copied to {:?}, {} collision(s), {} failure(s)",
        tallies.iter().map(|t| t.copied).sum::<usize>(),
        destination.root(),
        collision_count,
        failures.len()
    );

    Ok(MergeReport {
        destination: destination.root().to_path_buf(),
        tallies,
        collisions: collision_count,
        warnings,
        failures: failures.failures,
    })
}

/// One warning per file that a later source will overwrite.
fn find_collisions(pending: &[PendingCopy]) -> Vec<Warning> {
    let mut seen: HashMap<(ArtifactKind, &std::ffi::OsStr), Subset> = HashMap::new();
    let mut collisions = Vec::new();

    for file in pending {
        let Some(name) = file.path.file_name() else {
            continue;
        };
        if seen.insert((file.kind, name), file.subset).is_some() {
            collisions.push(Warning::Collision {
                name: name.to_string_lossy().into_owned(),
                kind: file.kind,
                overwritten_by: file.subset,
            });
        }
    }

    collisions
}
