use crate::error::{CropRotaError, Result};
use serde::{Deserialize, Serialize};

/// Crops offered as presets in the add-field form.
pub const COMMON_CROPS: &[&str] = &[
    "Wheat",
    "Onion",
    "Grapes",
    "Soybeans",
    "Sugarcane",
    "Cotton",
    "Maize",
    "Pulses",
];

pub const MIN_PH: f64 = 0.0;
pub const MAX_PH: f64 = 14.0;
pub const DEFAULT_PH: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilType {
    HeavyClay,
    LightClay,
    CoarseSandy,
    FineSandy,
    SandyLoam,
    SiltyLoam,
    PureSilt,
}

impl SoilType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::HeavyClay => "Heavy Clay",
            SoilType::LightClay => "Light Clay",
            SoilType::CoarseSandy => "Coarse Sandy",
            SoilType::FineSandy => "Fine Sandy",
            SoilType::SandyLoam => "Sandy Loam",
            SoilType::SiltyLoam => "Silty Loam",
            SoilType::PureSilt => "Pure Silt",
        }
    }

    /// Stable storage code, texture first.
    pub fn code(&self) -> &'static str {
        match self {
            SoilType::HeavyClay => "clay_heavy",
            SoilType::LightClay => "clay_light",
            SoilType::CoarseSandy => "sandy_coarse",
            SoilType::FineSandy => "sandy_fine",
            SoilType::SandyLoam => "loam_sandy",
            SoilType::SiltyLoam => "loam_silty",
            SoilType::PureSilt => "silt_pure",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        if let Some(soil) = Self::all().iter().find(|t| t.code() == normalized) {
            return Some(*soil);
        }
        match normalized.replace(['-', ' '], "").as_str() {
            "heavyclay" => Some(SoilType::HeavyClay),
            "lightclay" => Some(SoilType::LightClay),
            "coarsesandy" => Some(SoilType::CoarseSandy),
            "finesandy" => Some(SoilType::FineSandy),
            "sandyloam" => Some(SoilType::SandyLoam),
            "siltyloam" => Some(SoilType::SiltyLoam),
            "puresilt" => Some(SoilType::PureSilt),
            _ => None,
        }
    }

    pub fn all() -> &'static [SoilType] {
        &[
            SoilType::HeavyClay,
            SoilType::LightClay,
            SoilType::CoarseSandy,
            SoilType::FineSandy,
            SoilType::SandyLoam,
            SoilType::SiltyLoam,
            SoilType::PureSilt,
        ]
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: Option<i64>,
    pub name: String,
    pub size_acres: f64,
    pub soil_type: SoilType,
    pub current_crop: String,
    pub ph: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Field {
    pub fn new(name: String, soil_type: SoilType, current_crop: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: None,
            name,
            size_acres: 0.0,
            soil_type,
            current_crop,
            ph: DEFAULT_PH,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_size(mut self, acres: f64) -> Self {
        self.size_acres = acres;
        self
    }

    pub fn with_ph(mut self, ph: f64) -> Self {
        self.ph = ph;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CropRotaError::InvalidData("Field name is required.".into()));
        }
        validate_size(self.size_acres)?;
        validate_ph(self.ph)?;
        if self.current_crop.trim().is_empty() {
            return Err(CropRotaError::InvalidData("Current crop is required.".into()));
        }
        Ok(())
    }
}

pub fn validate_size(acres: f64) -> Result<()> {
    if !acres.is_finite() || acres < 0.0 {
        return Err(CropRotaError::InvalidData(
            "Please enter a non-negative size.".into(),
        ));
    }
    Ok(())
}

pub fn validate_ph(ph: f64) -> Result<()> {
    if !(MIN_PH..=MAX_PH).contains(&ph) {
        return Err(CropRotaError::InvalidData(
            "pH value must be between 0 and 14.".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field() -> Field {
        Field::new("North 40".into(), SoilType::SandyLoam, "Wheat".into())
            .with_size(40.0)
            .with_ph(6.5)
    }

    #[test]
    fn soil_type_from_str_valid() {
        assert_eq!(SoilType::from_str("clay_heavy"), Some(SoilType::HeavyClay));
        assert_eq!(SoilType::from_str("Heavy Clay"), Some(SoilType::HeavyClay));
        assert_eq!(SoilType::from_str("SandyLoam"), Some(SoilType::SandyLoam));
        assert_eq!(SoilType::from_str("loam_silty"), Some(SoilType::SiltyLoam));
        assert_eq!(SoilType::from_str("PURE SILT"), Some(SoilType::PureSilt));
    }

    #[test]
    fn soil_type_from_str_invalid() {
        assert_eq!(SoilType::from_str("dirt"), None);
        assert_eq!(SoilType::from_str(""), None);
    }

    #[test]
    fn soil_type_round_trip() {
        for soil in SoilType::all() {
            assert_eq!(SoilType::from_str(soil.code()), Some(*soil));
            assert_eq!(SoilType::from_str(&format!("{:?}", soil)), Some(*soil));
            assert_eq!(SoilType::from_str(soil.as_str()), Some(*soil));
        }
    }

    #[test]
    fn valid_field_passes() {
        assert!(sample_field().validate().is_ok());
        assert!(sample_field().with_size(0.0).with_ph(0.0).validate().is_ok());
        assert!(sample_field().with_ph(14.0).validate().is_ok());
    }

    #[test]
    fn negative_size_rejected() {
        let err = sample_field().with_size(-1.0).validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid data: Please enter a non-negative size.");
        assert!(sample_field().with_size(f64::NAN).validate().is_err());
    }

    #[test]
    fn ph_out_of_range_rejected() {
        assert!(sample_field().with_ph(-0.1).validate().is_err());
        let err = sample_field().with_ph(14.5).validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid data: pH value must be between 0 and 14.");
    }

    #[test]
    fn blank_name_or_crop_rejected() {
        let mut field = sample_field();
        field.name = "   ".into();
        assert!(field.validate().is_err());

        let mut field = sample_field();
        field.current_crop = String::new();
        assert!(field.validate().is_err());
    }
}
