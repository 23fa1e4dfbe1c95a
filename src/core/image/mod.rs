mod rotator;

pub use rotator::{rotate_images, RotateConfig, RotateReport, Rotation};
