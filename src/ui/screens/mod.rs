pub mod crops;
pub mod field_form;
pub mod fields;
pub mod plans;

pub use crops::CropsScreen;
pub use field_form::FieldFormScreen;
pub use fields::FieldsScreen;
pub use plans::PlansScreen;
