pub mod dataset;
pub mod error;
pub mod image;
pub mod labels;
pub mod operations;
pub mod partition;
pub mod progress;
pub mod report;

pub use error::{ConfigError, ToolError};
pub use report::{FileFailure, Warning};
