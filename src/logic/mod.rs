pub mod classification;
pub mod planner;
pub mod rotation;

pub use classification::CropTable;
pub use planner::build_plan;
pub use rotation::{RotationGenerator, DEFAULT_YEAR_COUNT};
