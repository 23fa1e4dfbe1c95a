mod dataset;
mod label;

pub use dataset::{ArtifactKind, DatasetDir, Subset};
pub use label::remap_class;
