use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InputError;

pub const FEATURE_COUNT: usize = 8;

/// Feature order the artifacts were fitted on. The scaler's parameters are
/// positional, so this order must match `ScalerArtifact::feature_names`.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub pregnancies: u32,
    pub glucose: u32,
    pub blood_pressure: u32,
    pub skin_thickness: u32,
    pub insulin: u32,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
    pub age: u32,
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self {
            pregnancies: 0,
            glucose: 120,
            blood_pressure: 70,
            skin_thickness: 20,
            insulin: 120,
            bmi: 32.0,
            diabetes_pedigree: 0.5,
            age: 30,
        }
    }
}

impl PatientRecord {
    pub fn validate(&self) -> Result<(), InputError> {
        check_range("Pregnancies", f64::from(self.pregnancies), 0.0, 20.0)?;
        check_range("Glucose", f64::from(self.glucose), 0.0, 300.0)?;
        check_range("BloodPressure", f64::from(self.blood_pressure), 0.0, 200.0)?;
        check_range("SkinThickness", f64::from(self.skin_thickness), 0.0, 100.0)?;
        check_range("Insulin", f64::from(self.insulin), 0.0, 900.0)?;
        check_range("BMI", self.bmi, 0.0, 80.0)?;
        check_range("DiabetesPedigreeFunction", self.diabetes_pedigree, 0.0, 3.0)?;
        check_range("Age", f64::from(self.age), 1.0, 120.0)?;
        Ok(())
    }

    /// Values in `FEATURE_NAMES` order.
    pub fn to_feature_vector(&self) -> Vec<f64> {
        vec![
            f64::from(self.pregnancies),
            f64::from(self.glucose),
            f64::from(self.blood_pressure),
            f64::from(self.skin_thickness),
            f64::from(self.insulin),
            self.bmi,
            self.diabetes_pedigree,
            f64::from(self.age),
        ]
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), InputError> {
    // NaN fails the contains check, so non-finite input is rejected here too.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(InputError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Lower bound closed, upper bound open: exactly 0.33 is Medium and
    /// exactly 0.66 is High.
    pub fn from_probability(probability: f64) -> RiskBand {
        if probability < 0.33 {
            RiskBand::Low
        } else if probability < 0.66 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskBand::Low => write!(f, "Low"),
            RiskBand::Medium => write!(f, "Medium"),
            RiskBand::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub probability: f64,
    pub decision: u8,
    pub risk_band: RiskBand,
}

impl ScoredResult {
    pub fn advisory(&self) -> &'static str {
        if self.decision == 1 {
            "Model suggests higher diabetes risk. Consider consulting a medical professional."
        } else {
            "Model suggests lower diabetes risk. Maintain healthy habits and regular checkups."
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub patient: String,
    pub record: PatientRecord,
    pub result: ScoredResult,
    pub scored_at: DateTime<Utc>,
}

impl Assessment {
    pub fn new(patient: impl Into<String>, record: PatientRecord, result: ScoredResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient: patient.into(),
            record,
            result,
            scored_at: Utc::now(),
        }
    }
}
