use super::rotation::RotationGenerator;
use crate::error::{CropRotaError, Result};
use crate::models::{Field, RotationPlan};
use rand::Rng;

/// Generates a rotation for a stored field and wraps it as a new plan.
pub fn build_plan<R: Rng + ?Sized>(
    generator: &RotationGenerator<'_>,
    field: &Field,
    year_count: i32,
    rng: &mut R,
) -> Result<RotationPlan> {
    let field_id = field
        .id
        .ok_or_else(|| CropRotaError::InvalidData("Field has no ID".into()))?;

    let sequence = generator.generate(&field.current_crop, year_count, rng)?;
    let plan = RotationPlan::from_sequence(field_id, sequence);

    tracing::info!(
        field = %field.name,
        plan_id = %plan.id,
        rotation = %plan.summary(),
        "Built rotation plan"
    );
    Ok(plan)
}
