use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationYear {
    pub year: u32,
    pub crop: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationPlan {
    pub id: String,
    pub field_id: i64,
    pub created_at: DateTime<Utc>,
    pub years: Vec<RotationYear>,
}

impl RotationPlan {
    /// Wraps a generated sequence, numbering years from 1.
    pub fn from_sequence(field_id: i64, sequence: Vec<String>) -> Self {
        let years = sequence
            .into_iter()
            .zip(1u32..)
            .map(|(crop, year)| RotationYear { year, crop })
            .collect();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            field_id,
            created_at: Utc::now(),
            years,
        }
    }

    pub fn crops(&self) -> impl Iterator<Item = &str> {
        self.years.iter().map(|y| y.crop.as_str())
    }

    /// One-line summary, e.g. "wheat → peas → corn → beans".
    pub fn summary(&self) -> String {
        self.crops().collect::<Vec<_>>().join(" → ")
    }
}
