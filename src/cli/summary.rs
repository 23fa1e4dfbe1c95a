use crate::core::dataset::{ArtifactKind, Subset};
use crate::core::image::RotateReport;
use crate::core::labels::FixLabelsReport;
use crate::core::partition::{MergeReport, SplitReport};
use crate::core::{FileFailure, Warning};

fn print_warnings_and_failures(warnings: &[Warning], failures: &[FileFailure]) {
    for warning in warnings {
        println!("  warning: {}", warning);
    }
    if !failures.is_empty() {
        println!("  {} file(s) failed:", failures.len());
        for failure in failures {
            println!("    [{}] {}", failure.operation, failure.message);
        }
    }
}

pub fn print_split(report: &SplitReport) {
    println!("Split summary ({})", report.output_dir.display());
    println!("  images found: {}", report.total_images);
    if report.pruned_count() > 0 {
        println!("  orphan labels deleted: {}", report.pruned_count());
    } else if !report.orphan_labels.is_empty() {
        println!("  orphan labels kept: {}", report.orphan_labels.len());
    }
    for subset in Subset::ALL {
        let tally = report.subset(subset);
        println!(
            "  {:<5} {} images, {} labels ({} without label)",
            tally.subset.as_str(),
            tally.images,
            tally.labels,
            tally.images_without_labels
        );
    }
    print_warnings_and_failures(&report.warnings, &report.failures);
}

pub fn print_merge(report: &MergeReport) {
    println!("Merge summary ({})", report.destination.display());
    for subset in Subset::ALL {
        for kind in ArtifactKind::ALL {
            if let Some(tally) = report.tally(subset, kind) {
                println!(
                    "  {:<5} {:<6} {}/{} copied",
                    subset.as_str(),
                    kind.as_str(),
                    tally.copied,
                    tally.found
                );
            }
        }
    }
    println!("  total files copied: {}", report.total_copied());
    if report.collisions > 0 {
        println!("  name collisions (later source kept): {}", report.collisions);
    }
    print_warnings_and_failures(&report.warnings, &report.failures);
}

pub fn print_fix_labels(report: &FixLabelsReport) {
    println!(
        "Label fix summary ({}: class {} -> {})",
        report.labels_dir.display(),
        report.from_class,
        report.to_class
    );
    println!("  files processed: {}", report.files_scanned);
    println!("  files modified: {}", report.files_modified);
    println!("  files unchanged: {}", report.files_unchanged());
    println!("  lines changed: {}", report.lines_changed);
    print_warnings_and_failures(&report.warnings, &report.failures);
}

pub fn print_rotate(report: &RotateReport) {
    println!("Rotate summary ({})", report.output_dir.display());
    println!(
        "  images written: {}/{}",
        report.images_written, report.images_found
    );
    print_warnings_and_failures(&report.warnings, &report.failures);
}
