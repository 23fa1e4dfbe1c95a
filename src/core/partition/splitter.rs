//! Random train/valid/test partitioning of a YOLO dataset.
//!
//! The source must contain `images/` and `labels/`. Labels without a matching
//! image are pruned first, then the images are shuffled and sliced into three
//! contiguous ranges that are copied, together with their labels, into
//! `<output>/{train,valid,test}/{images,labels}`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::dataset::{DatasetDir, Subset};
use crate::core::error::{reject_overlap, ConfigError, ToolResult};
use crate::core::operations::{
    basename, copy_into_dir, ensure_dir, has_extension, label_path_for_image, list_files,
    remove_file,
};
use crate::core::progress::ProgressReporter;
use crate::core::report::{FailureLog, FileFailure, Warning};

/// Train and valid fractions; test takes whatever is left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitRatios {
    train: f64,
    valid: f64,
}

impl SplitRatios {
    pub fn new(train: f64, valid: f64) -> Result<Self, ConfigError> {
        if !train.is_finite() || train < 0.0 {
            return Err(ConfigError::InvalidRatio {
                name: "train",
                value: train,
            });
        }
        if !valid.is_finite() || valid < 0.0 {
            return Err(ConfigError::InvalidRatio {
                name: "valid",
                value: valid,
            });
        }
        if train + valid >= 1.0 {
            return Err(ConfigError::RatioSumTooLarge { train, valid });
        }
        Ok(Self { train, valid })
    }

    pub fn train(&self) -> f64 {
        self.train
    }

    pub fn valid(&self) -> f64 {
        self.valid
    }

    pub fn test(&self) -> f64 {
        1.0 - self.train - self.valid
    }

    /// Subset sizes for `total` images: floor for train and valid, the rest
    /// goes to test.
    pub fn counts(&self, total: usize) -> [usize; 3] {
        let train = (total as f64 * self.train).floor() as usize;
        let valid = (total as f64 * self.valid).floor() as usize;
        let valid = valid.min(total - train);
        [train, valid, total - train - valid]
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            valid: 0.2,
        }
    }
}

/// What to do with labels that have no image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Delete them from the source `labels/` folder.
    #[default]
    Delete,
    /// Leave the source untouched and only list them.
    ReportOnly,
}

#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ratios: SplitRatios,
    /// Fixed shuffle seed; `None` draws from the thread RNG.
    pub seed: Option<u64>,
    pub orphan_policy: OrphanPolicy,
}

impl SplitConfig {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, ratios: SplitRatios) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            ratios,
            seed: None,
            orphan_policy: OrphanPolicy::default(),
        }
    }
}

/// Per-subset result of a split.
#[derive(Debug, Clone, Serialize)]
pub struct SubsetTally {
    pub subset: Subset,
    /// Images assigned to this subset.
    pub assigned: usize,
    /// Images actually copied.
    pub images: usize,
    pub labels: usize,
    /// Images copied without an annotation (negative examples).
    pub images_without_labels: usize,
    /// File names of the images assigned here, in copy order.
    #[serde(skip)]
    pub image_names: Vec<String>,
}

impl SubsetTally {
    fn new(subset: Subset) -> Self {
        Self {
            subset,
            assigned: 0,
            images: 0,
            labels: 0,
            images_without_labels: 0,
            image_names: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ratios: SplitRatios,
    pub total_images: usize,
    pub orphan_policy: OrphanPolicy,
    /// Orphan labels found; deleted unless the policy is report-only.
    pub orphan_labels: Vec<PathBuf>,
    pub subsets: Vec<SubsetTally>,
    pub warnings: Vec<Warning>,
    pub failures: Vec<FileFailure>,
}

impl SplitReport {
    pub fn subset(&self, subset: Subset) -> &SubsetTally {
        // subsets always holds one tally per Subset, in Subset::ALL order
        &self.subsets[Subset::ALL.iter().position(|s| *s == subset).unwrap_or(0)]
    }

    pub fn pruned_count(&self) -> usize {
        match self.orphan_policy {
            OrphanPolicy::Delete => self.orphan_labels.len(),
            OrphanPolicy::ReportOnly => 0,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Split `config.source_dir` into train/valid/test under `config.output_dir`.
///
/// Nothing is written or deleted until the ratios and source layout have been
/// validated. Single file failures are recorded in the report and skipped.
pub fn split_dataset(
    config: &SplitConfig,
    progress: &mut dyn ProgressReporter,
) -> ToolResult<SplitReport> {
    let ratios = SplitRatios::new(config.ratios.train, config.ratios.valid)?;
    let source = DatasetDir::open_existing(&config.source_dir)?;
    let output = DatasetDir::new(&config.output_dir);
    let images_dir = source.images_dir();
    let labels_dir = source.labels_dir();
    for subset in Subset::ALL {
        let target = output.subset(subset);
        reject_overlap(&images_dir, &target.images_dir())?;
        reject_overlap(&labels_dir, &target.labels_dir())?;
    }

    info!(
        "Starting dataset split of {:?} (train {:.1}%, valid {:.1}%, test {:.1}%)",
        source.root(),
        ratios.train() * 100.0,
        ratios.valid() * 100.0,
        ratios.test() * 100.0
    );

    let mut images = list_files(&images_dir)?;
    info!("Found {} images in {:?}", images.len(), images_dir);

    let mut failures = FailureLog::default();
    let orphan_labels = prune_orphan_labels(&images, &labels_dir, config.orphan_policy, &mut failures)?;

    shuffle_images(&mut images, config.seed);

    let counts = ratios.counts(images.len());
    let mut warnings = Vec::new();
    if images.is_empty() {
        warn!("No images found in {:?}; creating empty subsets", images_dir);
        warnings.push(Warning::EmptyInput { path: images_dir.clone() });
    }

    let mut subsets = Vec::with_capacity(Subset::ALL.len());
    let mut processed = 0;
    let total = images.len();
    let mut remaining = images.as_slice();

    for (subset, count) in Subset::ALL.into_iter().zip(counts) {
        let (slice, rest) = remaining.split_at(count);
        remaining = rest;

        let target = output.subset(subset);
        let target_images = target.images_dir();
        let target_labels = target.labels_dir();
        ensure_dir(&target_images)?;
        ensure_dir(&target_labels)?;

        info!("Processing {} set ({} images)", subset, slice.len());
        let mut tally = SubsetTally::new(subset);
        tally.assigned = slice.len();

        for image in slice {
            if let Some(name) = image.file_name() {
                tally.image_names.push(name.to_string_lossy().into_owned());
            }
            if failures.record(copy_into_dir(image, &target_images)).is_some() {
                tally.images += 1;
            }

            match label_path_for_image(&labels_dir, image) {
                Some(label) if label.is_file() => {
                    if failures.record(copy_into_dir(&label, &target_labels)).is_some() {
                        tally.labels += 1;
                    }
                }
                _ => {
                    debug!("No label for {:?}, copied as image-only", image);
                    tally.images_without_labels += 1;
                }
            }

            processed += 1;
            progress.report(processed, total);
        }

        subsets.push(tally);
    }

    info!(
        "Split complete: train {}, valid {}, test {}, {} orphan label(s), {} failure(s)",
        counts[0],
        counts[1],
        counts[2],
        orphan_labels.len(),
        failures.len()
    );

    Ok(SplitReport {
        source_dir: config.source_dir.clone(),
        output_dir: config.output_dir.clone(),
        ratios,
        total_images: total,
        orphan_policy: config.orphan_policy,
        orphan_labels,
        subsets,
        warnings,
        failures: failures.failures,
    })
}

/// Find `.txt` labels whose basename matches no image and, under the delete
/// policy, remove them. Returns the orphans that were handled.
fn prune_orphan_labels(
    images: &[PathBuf],
    labels_dir: &Path,
    policy: OrphanPolicy,
    failures: &mut FailureLog,
) -> ToolResult<Vec<PathBuf>> {
    let image_stems: HashSet<String> = images.iter().filter_map(|p| basename(p)).collect();

    let mut orphans = Vec::new();
    for label in list_files(labels_dir)? {
        if !has_extension(&label, &["txt"]) {
            continue;
        }
        let Some(stem) = basename(&label) else {
            continue;
        };
        if image_stems.contains(&stem) {
            continue;
        }

        match policy {
            OrphanPolicy::Delete => {
                if failures.record(remove_file(&label)).is_some() {
                    warn!("Removed orphaned label file: {:?}", label);
                    orphans.push(label);
                }
            }
            OrphanPolicy::ReportOnly => {
                warn!("Orphaned label file (kept): {:?}", label);
                orphans.push(label);
            }
        }
    }

    Ok(orphans)
}

fn shuffle_images(images: &mut [PathBuf], seed: Option<u64>) {
    match seed {
        Some(seed) => {
            debug!("Shuffling with fixed seed {}", seed);
            images.shuffle(&mut StdRng::seed_from_u64(seed));
        }
        None => images.shuffle(&mut rand::thread_rng()),
    }
}
