use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::core::error::{ConfigError, ToolResult};
use crate::core::operations::{ensure_dir, has_extension, list_files, FileOpError, FileOpResult};
use crate::core::progress::ProgressReporter;
use crate::core::report::{FailureLog, FileFailure, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Rotation {
    /// 90° counter-clockwise
    #[value(name = "left90")]
    Left90,
    /// 90° clockwise
    #[value(name = "right90")]
    Right90,
    /// Mirror top to bottom
    FlipVertical,
}

impl Rotation {
    pub fn apply(&self, img: &::image::DynamicImage) -> ::image::DynamicImage {
        match self {
            Rotation::Left90 => img.rotate270(),
            Rotation::Right90 => img.rotate90(),
            Rotation::FlipVertical => img.flipv(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RotateConfig {
    /// A single image or a folder of images.
    pub target: PathBuf,
    pub rotation: Rotation,
}

#[derive(Debug, Clone, Serialize)]
pub struct RotateReport {
    pub output_dir: PathBuf,
    pub rotation: Rotation,
    pub images_found: usize,
    pub images_written: usize,
    pub warnings: Vec<Warning>,
    pub failures: Vec<FileFailure>,
}

impl RotateReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Rotate one image, or every jpg/jpeg/png in a folder, into a `rotated/`
/// folder next to the input. Originals are never modified.
pub fn rotate_images(
    config: &RotateConfig,
    progress: &mut dyn ProgressReporter,
) -> ToolResult<RotateReport> {
    let app_config = AppConfig::default();
    let target = &config.target;
    if !target.exists() {
        return Err(ConfigError::MissingPath {
            path: target.clone(),
        }
        .into());
    }

    let (inputs, output_dir) = if target.is_dir() {
        let images: Vec<PathBuf> = list_files(target)?
            .into_iter()
            .filter(|p| has_extension(p, &app_config.image_extensions))
            .collect();
        (images, target.join(app_config.rotated_dir_name))
    } else {
        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        (vec![target.clone()], parent.join(app_config.rotated_dir_name))
    };

    ensure_dir(&output_dir)?;
    info!(
        "Rotating {} image(s) ({:?}) into {:?}",
        inputs.len(),
        config.rotation,
        output_dir
    );

    let mut warnings = Vec::new();
    if inputs.is_empty() {
        warn!("No images found in {:?}", target);
        warnings.push(Warning::EmptyInput {
            path: target.clone(),
        });
    }

    let mut failures = FailureLog::default();
    let mut written = 0;
    let total = inputs.len();
    for (idx, input) in inputs.iter().enumerate() {
        if failures
            .record(rotate_one(input, &output_dir, config.rotation))
            .is_some()
        {
            written += 1;
        }
        progress.report(idx + 1, total);
    }

    info!("Images saved to {:?} ({} failed)", output_dir, failures.len());

    Ok(RotateReport {
        output_dir,
        rotation: config.rotation,
        images_found: total,
        images_written: written,
        warnings,
        failures: failures.failures,
    })
}

fn rotate_one(input: &Path, output_dir: &Path, rotation: Rotation) -> FileOpResult<PathBuf> {
    let image_error = |source: ::image::ImageError| FileOpError::ImageFailed {
        path: input.to_path_buf(),
        source,
    };

    let img = ::image::open(input).map_err(image_error)?;
    let rotated = rotation.apply(&img);

    let name = input.file_name().unwrap_or(input.as_os_str());
    let output = output_dir.join(name);
    rotated.save(&output).map_err(image_error)?;
    debug!("Wrote {:?}", output);
    Ok(output)
}
