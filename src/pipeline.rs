use crate::artifacts::{ClassifierArtifact, ScalerArtifact};
use crate::error::{InputError, ScoreError};
use crate::models::{PatientRecord, RiskBand, ScoredResult};

/// Probability at or above which the classifier flags the record.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Runs one record through the fitted scaler and classifier.
///
/// The record is validated and its arity checked against the scaler before
/// any transform runs; a wrong-length vector fed to positional parameters
/// would produce silently wrong results rather than an error.
pub fn score(
    record: &PatientRecord,
    scaler: &ScalerArtifact,
    classifier: &ClassifierArtifact,
) -> Result<ScoredResult, ScoreError> {
    record.validate()?;

    let features = record.to_feature_vector();
    if features.len() != scaler.n_features() {
        return Err(InputError::WrongArity {
            expected: scaler.n_features(),
            actual: features.len(),
        }
        .into());
    }

    let standardized = scaler.transform(&features);
    let probability = classifier.predict_probability(&standardized);

    Ok(ScoredResult {
        probability,
        decision: u8::from(probability >= DECISION_THRESHOLD),
        risk_band: RiskBand::from_probability(probability),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FEATURE_NAMES;

    fn identity_scaler() -> ScalerArtifact {
        ScalerArtifact {
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            mean: vec![0.0; 8],
            scale: vec![1.0; 8],
        }
    }

    /// Zero coefficients pin the probability at sigmoid(intercept) regardless
    /// of the record, which makes threshold behavior easy to steer.
    fn fixed_classifier(intercept: f64) -> ClassifierArtifact {
        ClassifierArtifact {
            model_name: "fixed".to_string(),
            coefficients: vec![0.0; 8],
            intercept,
        }
    }

    #[test]
    fn probability_stays_in_unit_interval() {
        let scaler = identity_scaler();
        for intercept in [-50.0, -1.0, 0.0, 1.0, 50.0] {
            let result = score(
                &PatientRecord::default(),
                &scaler,
                &fixed_classifier(intercept),
            )
            .unwrap();
            assert!((0.0..=1.0).contains(&result.probability));
        }
    }

    #[test]
    fn decision_boundary_is_inclusive_at_half() {
        let scaler = identity_scaler();

        // intercept 0 gives exactly 0.5
        let at_boundary = score(&PatientRecord::default(), &scaler, &fixed_classifier(0.0)).unwrap();
        assert!((at_boundary.probability - 0.5).abs() < 1e-12);
        assert_eq!(at_boundary.decision, 1);
        assert_eq!(at_boundary.risk_band, RiskBand::Medium);

        let below = score(&PatientRecord::default(), &scaler, &fixed_classifier(-0.1)).unwrap();
        assert_eq!(below.decision, 0);
    }

    #[test]
    fn scoring_is_idempotent() {
        let scaler = ScalerArtifact {
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            mean: vec![3.0, 120.0, 69.0, 20.0, 80.0, 32.0, 0.47, 33.0],
            scale: vec![3.4, 32.0, 19.3, 16.0, 115.0, 7.9, 0.33, 11.8],
        };
        let classifier = ClassifierArtifact {
            model_name: "baseline".to_string(),
            coefficients: vec![0.39, 1.13, -0.24, 0.03, -0.15, 0.70, 0.30, 0.42],
            intercept: -0.86,
        };
        let record = PatientRecord::default();

        let first = score(&record, &scaler, &classifier).unwrap();
        let second = score(&record, &scaler, &classifier).unwrap();
        assert_eq!(first.probability.to_bits(), second.probability.to_bits());
        assert_eq!(first.decision, second.decision);
        assert_eq!(first.risk_band, second.risk_band);
    }

    #[test]
    fn out_of_domain_record_is_rejected_before_scaling() {
        let record = PatientRecord {
            insulin: 901,
            ..PatientRecord::default()
        };
        let result = score(&record, &identity_scaler(), &fixed_classifier(0.0));
        assert!(matches!(
            result,
            Err(ScoreError::Input(InputError::OutOfRange { field: "Insulin", .. }))
        ));
    }

    #[test]
    fn reference_artifacts_reproduce_pinned_probabilities() {
        let base = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        let store = crate::artifacts::ArtifactStore::new(
            base.join(crate::artifacts::DEFAULT_SCALER_PATH),
            base.join(crate::artifacts::DEFAULT_MODEL_PATH),
        );
        let loaded = store.get().unwrap();

        let result = score(&PatientRecord::default(), &loaded.scaler, &loaded.classifier).unwrap();
        assert!((result.probability - 0.18380962184082664).abs() < 1e-9);
        assert_eq!(result.decision, 0);
        assert_eq!(result.risk_band, RiskBand::Low);

        let elevated = PatientRecord {
            pregnancies: 8,
            glucose: 196,
            blood_pressure: 76,
            skin_thickness: 36,
            insulin: 249,
            bmi: 36.5,
            diabetes_pedigree: 0.875,
            age: 29,
        };
        let result = score(&elevated, &loaded.scaler, &loaded.classifier).unwrap();
        assert!((result.probability - 0.9324155680271646).abs() < 1e-9);
        assert_eq!(result.decision, 1);
        assert_eq!(result.risk_band, RiskBand::High);
    }

    #[test]
    fn arity_mismatch_against_the_scaler_is_rejected() {
        let mut scaler = identity_scaler();
        scaler.feature_names.push("Extra".to_string());
        scaler.mean.push(0.0);
        scaler.scale.push(1.0);

        let result = score(
            &PatientRecord::default(),
            &scaler,
            &fixed_classifier(0.0),
        );
        assert!(matches!(
            result,
            Err(ScoreError::Input(InputError::WrongArity {
                expected: 9,
                actual: 8,
            }))
        ));
    }
}
