mod fixer;

pub use fixer::{fix_label_classes, FixLabelsConfig, FixLabelsReport};
