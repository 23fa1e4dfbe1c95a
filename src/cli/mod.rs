//! Command-line shell: turns parsed arguments into operation configs, drives
//! the progress bar, prints summaries and maps outcomes to exit codes.

mod args;
mod summary;

pub use args::{Cli, Command};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info, info_span, warn};

use crate::core::image::{rotate_images, RotateConfig};
use crate::core::labels::{fix_label_classes, FixLabelsConfig};
use crate::core::partition::{
    merge_datasets, split_dataset, MergeConfig, OrphanPolicy, SplitConfig, SplitRatios,
};
use crate::core::{ConfigError, ToolError};
use args::{FixLabelsArgs, MergeArgs, RotateArgs, SplitArgs};

/// Process exit statuses.
pub mod exit {
    pub const SUCCESS: u8 = 0;
    pub const FATAL: u8 = 1;
    pub const CONFIG: u8 = 2;
    pub const PARTIAL: u8 = 3;
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write report {path}: {source}")]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Tool(ToolError::Config(_)) => exit::CONFIG,
            _ => exit::FATAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Tool(ToolError::Config(error))
    }
}

/// Log filter used when `RUST_LOG` is not set.
pub fn log_level(cli: &Cli) -> &'static str {
    if cli.quiet {
        return "warn";
    }
    match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Run the selected subcommand and return the process exit status.
pub fn run(cli: &Cli) -> ExitCode {
    let result = match &cli.command {
        Command::Split(args) => {
            let _span = info_span!("split").entered();
            run_split(args, cli.quiet)
        }
        Command::Merge(args) => {
            let _span = info_span!("merge").entered();
            run_merge(args, cli.quiet)
        }
        Command::FixLabels(args) => {
            let _span = info_span!("fix-labels").entered();
            run_fix_labels(args, cli.quiet)
        }
        Command::Rotate(args) => {
            let _span = info_span!("rotate").entered();
            run_rotate(args, cli.quiet)
        }
    };

    match result {
        Ok(true) => {
            warn!("Completed with per-file failures; see the summary above");
            ExitCode::from(exit::PARTIAL)
        }
        Ok(false) => ExitCode::from(exit::SUCCESS),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn progress_bar(quiet: bool, label: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{msg}] [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.set_message(label.to_string());
    bar
}

/// Adapts a bar to the `(processed, total)` callback the operations expect.
fn follow(bar: &ProgressBar) -> impl FnMut(usize, usize) + '_ {
    move |processed, total| {
        bar.set_length(total as u64);
        bar.set_position(processed as u64);
    }
}

/// Returns whether any file failed.
fn run_split(args: &SplitArgs, quiet: bool) -> Result<bool, CliError> {
    let mut config = SplitConfig::new(
        &args.source,
        &args.output,
        SplitRatios::new(args.train, args.valid)?,
    );
    config.seed = args.seed;
    if args.keep_orphans {
        config.orphan_policy = OrphanPolicy::ReportOnly;
    } else {
        warn!(
            "Orphan labels will be deleted from {:?} (use --keep-orphans to keep them)",
            args.source.join("labels")
        );
    }

    let bar = progress_bar(quiet, "Split");
    let report = split_dataset(&config, &mut follow(&bar))?;
    bar.finish_and_clear();

    summary::print_split(&report);
    write_report(args.report.as_deref(), &report)?;
    Ok(report.has_failures())
}

fn run_merge(args: &MergeArgs, quiet: bool) -> Result<bool, CliError> {
    let mut config = MergeConfig::new(&args.train, &args.valid, &args.test, &args.root);
    config.collision_policy = args.on_collision;

    let bar = progress_bar(quiet, "Merge");
    let report = merge_datasets(&config, &mut follow(&bar))?;
    bar.finish_and_clear();

    summary::print_merge(&report);
    write_report(args.report.as_deref(), &report)?;
    Ok(report.has_failures())
}

fn run_fix_labels(args: &FixLabelsArgs, quiet: bool) -> Result<bool, CliError> {
    let config = FixLabelsConfig {
        labels_dir: args.labels_dir.clone(),
        from_class: args.from,
        to_class: args.to,
    };

    let bar = progress_bar(quiet, "Fix labels");
    let report = fix_label_classes(&config, &mut follow(&bar))?;
    bar.finish_and_clear();

    summary::print_fix_labels(&report);
    write_report(args.report.as_deref(), &report)?;
    Ok(report.has_failures())
}

fn run_rotate(args: &RotateArgs, quiet: bool) -> Result<bool, CliError> {
    let config = RotateConfig {
        target: args.target.clone(),
        rotation: args.rotation,
    };

    let bar = progress_bar(quiet, "Rotate");
    let report = rotate_images(&config, &mut follow(&bar))?;
    bar.finish_and_clear();

    summary::print_rotate(&report);
    write_report(args.report.as_deref(), &report)?;
    Ok(report.has_failures())
}

fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> Result<(), CliError> {
    let Some(path) = path else {
        return Ok(());
    };
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|source| CliError::WriteReport {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Report written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    #[test]
    fn test_log_level_from_flags() {
        let cli = Cli::parse_from(["yolo-dataset-tools", "-vv", "fix-labels", "x"]);
        assert_eq!(log_level(&cli), "trace");
        let cli = Cli::parse_from(["yolo-dataset-tools", "fix-labels", "x", "-q"]);
        assert_eq!(log_level(&cli), "warn");
    }

    #[test]
    fn test_follow_tracks_bar_position() {
        let bar = ProgressBar::hidden();
        let mut report = follow(&bar);
        report(4, 10);
        assert_eq!(bar.position(), 4);
        assert_eq!(bar.length(), Some(10));
    }

    #[test]
    fn test_config_error_maps_to_exit_code_two() {
        let err = CliError::from(ConfigError::SameClass { class: 1 });
        assert_eq!(err.exit_code(), exit::CONFIG);
    }

    #[test]
    fn test_run_split_writes_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir_all(source.join("images")).unwrap();
        fs::create_dir_all(source.join("labels")).unwrap();
        fs::write(source.join("images").join("a.jpg"), "a").unwrap();
        fs::write(source.join("labels").join("a.txt"), "0 0.5 0.5 0.1 0.1\n").unwrap();
        let report_path = dir.path().join("report.json");

        let args = SplitArgs {
            source,
            output: dir.path().join("out"),
            train: 0.7,
            valid: 0.2,
            seed: Some(1),
            keep_orphans: false,
            report: Some(report_path.clone()),
        };
        let failed = run_split(&args, true).unwrap();
        assert!(!failed);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
        assert_eq!(json["total_images"], 1);
        assert_eq!(json["subsets"][2]["subset"], "test");
    }

    #[test]
    fn test_run_split_with_bad_ratios_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = SplitArgs {
            source: dir.path().to_path_buf(),
            output: dir.path().join("out"),
            train: 0.6,
            valid: 0.4,
            seed: None,
            keep_orphans: false,
            report: None,
        };
        let err = run_split(&args, true).unwrap_err();
        assert_eq!(err.exit_code(), exit::CONFIG);
    }
}
