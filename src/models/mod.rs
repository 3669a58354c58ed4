pub mod crop_group;
pub mod field;
pub mod rotation_plan;

pub use crop_group::*;
pub use field::*;
pub use rotation_plan::*;
