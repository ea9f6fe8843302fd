use std::path::Path;

use anyhow::Context;

use crate::artifacts::ArtifactStore;
use crate::error::ScoreError;
use crate::models::{Assessment, PatientRecord};
use crate::pipeline;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    patient: String,
    pregnancies: u32,
    glucose: u32,
    blood_pressure: u32,
    skin_thickness: u32,
    insulin: u32,
    bmi: f64,
    diabetes_pedigree: f64,
    age: u32,
}

impl CsvRow {
    fn into_parts(self) -> (String, PatientRecord) {
        let record = PatientRecord {
            pregnancies: self.pregnancies,
            glucose: self.glucose,
            blood_pressure: self.blood_pressure,
            skin_thickness: self.skin_thickness,
            insulin: self.insulin,
            bmi: self.bmi,
            diabetes_pedigree: self.diabetes_pedigree,
            age: self.age,
        };
        (self.patient, record)
    }
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub assessments: Vec<Assessment>,
    pub skipped: usize,
}

/// Scores every patient row in a CSV file against the already-loaded
/// artifacts. Rows that fail input validation are skipped and counted;
/// artifact failures abort the whole batch.
pub fn score_csv(csv_path: &Path, store: &ArtifactStore) -> anyhow::Result<BatchOutcome> {
    let artifacts = store.cached().map_err(ScoreError::Artifact)?;

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;

    let mut assessments = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<CsvRow>() {
        let (patient, record) = row?.into_parts();
        match pipeline::score(&record, &artifacts.scaler, &artifacts.classifier) {
            Ok(result) => assessments.push(Assessment::new(patient, record, result)),
            Err(ScoreError::Input(reason)) => {
                log::warn!("skipping {patient}: {reason}");
                skipped += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(BatchOutcome {
        assessments,
        skipped,
    })
}
