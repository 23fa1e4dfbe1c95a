mod merger;
mod splitter;

pub use merger::{merge_datasets, CollisionPolicy, MergeConfig, MergeReport};
pub use splitter::{split_dataset, OrphanPolicy, SplitConfig, SplitRatios, SplitReport};
