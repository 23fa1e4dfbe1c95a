use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::AppConfig;
use crate::core::image::Rotation;
use crate::core::partition::CollisionPolicy;

/// Split, merge and clean up YOLO image/label datasets.
#[derive(Parser, Debug)]
#[command(name = "yolo-dataset-tools", version, long_about = None)]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors, hide the progress bar
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Do not write a log file
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Randomly split <SOURCE>/{images,labels} into train/valid/test
    Split(SplitArgs),
    /// Merge train/valid/test folders into <ROOT>/merged_<date>
    Merge(MergeArgs),
    /// Replace one class index with another in YOLO label files
    FixLabels(FixLabelsArgs),
    /// Rotate or flip an image, or every image in a folder
    Rotate(RotateArgs),
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Folder containing `images` and `labels`
    pub source: PathBuf,

    /// Folder that receives train/valid/test
    pub output: PathBuf,

    /// Proportion of images for training
    #[arg(long, default_value_t = AppConfig::default().default_train_ratio, value_parser = validate_ratio)]
    pub train: f64,

    /// Proportion of images for validation; test gets the rest
    #[arg(long, default_value_t = AppConfig::default().default_valid_ratio, value_parser = validate_ratio)]
    pub valid: f64,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// List orphan labels instead of deleting them from the source
    #[arg(long)]
    pub keep_orphans: bool,

    /// Write the full report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    pub train: PathBuf,
    pub valid: PathBuf,
    pub test: PathBuf,
    /// Folder in which merged_<YYYY-MM-DD> is created
    pub root: PathBuf,

    /// What to do when two sources contain the same file name
    #[arg(long, value_enum, default_value = "overwrite")]
    pub on_collision: CollisionPolicy,

    /// Write the full report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FixLabelsArgs {
    /// Folder of YOLO `.txt` label files
    pub labels_dir: PathBuf,

    /// Class index to replace
    #[arg(long, default_value_t = AppConfig::default().default_from_class)]
    pub from: u32,

    /// Replacement class index
    #[arg(long, default_value_t = AppConfig::default().default_to_class)]
    pub to: u32,

    /// Write the full report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Image file or folder of images
    pub target: PathBuf,

    #[arg(short, long, value_enum)]
    pub rotation: Rotation,

    /// Write the full report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

// Range checks happen here; the train + valid < 1 rule is enforced by SplitRatios.
fn validate_ratio(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..1.0).contains(&val) => Ok(val),
        _ => Err("RATIO must be a number in [0.0, 1.0)".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_defaults_match_app_config() {
        let cli = Cli::try_parse_from(["yolo-dataset-tools", "split", "src", "out"]).unwrap();
        let config = AppConfig::default();
        match cli.command {
            Command::Split(args) => {
                assert_eq!(args.train, config.default_train_ratio);
                assert_eq!(args.valid, config.default_valid_ratio);
                assert!(!args.keep_orphans);
                assert!(args.seed.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fix_labels_defaults_match_app_config() {
        let cli = Cli::try_parse_from(["yolo-dataset-tools", "fix-labels", "labels"]).unwrap();
        let config = AppConfig::default();
        match cli.command {
            Command::FixLabels(args) => {
                assert_eq!(args.from, config.default_from_class);
                assert_eq!(args.to, config.default_to_class);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ratio_out_of_range_is_rejected() {
        let result =
            Cli::try_parse_from(["yolo-dataset-tools", "split", "a", "b", "--train", "1.5"]);
        assert!(result.is_err());
        let result =
            Cli::try_parse_from(["yolo-dataset-tools", "split", "a", "b", "--valid", "abc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_collision_policy_parses() {
        let cli = Cli::try_parse_from([
            "yolo-dataset-tools",
            "merge",
            "t",
            "v",
            "s",
            "root",
            "--on-collision",
            "fail",
        ])
        .unwrap();
        match cli.command {
            Command::Merge(args) => assert_eq!(args.on_collision, CollisionPolicy::Fail),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rotate_values() {
        for (value, expected) in [
            ("left90", Rotation::Left90),
            ("right90", Rotation::Right90),
            ("flip-vertical", Rotation::FlipVertical),
        ] {
            let cli = Cli::try_parse_from(["yolo-dataset-tools", "rotate", "img.jpg", "-r", value])
                .unwrap();
            match cli.command {
                Command::Rotate(args) => assert_eq!(args.rotation, expected),
                other => panic!("unexpected command: {:?}", other),
            }
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
