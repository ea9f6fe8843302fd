//! Loading and validation of the pretrained scaler and classifier.
//!
//! Both artifacts are produced by an external training pipeline and consumed
//! here as opaque scorers: the scaler standardizes a feature vector and the
//! classifier maps the standardized vector to a positive-class probability.
//! They are read once per process and cached read-only.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::models::FEATURE_NAMES;

pub const DEFAULT_SCALER_PATH: &str = "models/scaler.json";
pub const DEFAULT_MODEL_PATH: &str = "models/baseline_model.json";

/// Standard scaler fitted during training: per-feature mean and scale,
/// positional, in `feature_names` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerArtifact {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Maps a raw feature vector into the standardized space the classifier
    /// was trained on. Callers must pass exactly `n_features` values.
    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect()
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != self.feature_names.len() || self.scale.len() != self.feature_names.len() {
            return Err(ArtifactError::UnevenScaler {
                names: self.feature_names.len(),
                values: self.mean.len().max(self.scale.len()),
            });
        }

        // The fitted parameters are positional; a reordered or renamed schema
        // would standardize every field with the wrong parameters and produce
        // silently wrong probabilities.
        if self.feature_names != FEATURE_NAMES {
            return Err(ArtifactError::SchemaMismatch {
                expected: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
                found: self.feature_names.clone(),
            });
        }

        for (name, scale) in self.feature_names.iter().zip(self.scale.iter()) {
            if *scale == 0.0 || !scale.is_finite() {
                return Err(ArtifactError::DegenerateScale { field: name.clone() });
            }
        }

        Ok(())
    }
}

/// Logistic classifier fitted during training on standardized features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub model_name: String,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl ClassifierArtifact {
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Positive-class probability for an already-standardized feature vector.
    pub fn predict_probability(&self, features: &[f64]) -> f64 {
        let logit = self
            .coefficients
            .iter()
            .zip(features.iter())
            .map(|(coefficient, x)| coefficient * x)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-logit).exp())
    }
}

#[derive(Debug)]
pub struct ArtifactSet {
    pub scaler: ScalerArtifact,
    pub classifier: ClassifierArtifact,
}

impl ArtifactSet {
    fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, ArtifactError> {
        log::debug!("loading scaler from {}", scaler_path.display());
        let scaler: ScalerArtifact = read_json(scaler_path)?;
        log::debug!("loading classifier from {}", model_path.display());
        let classifier: ClassifierArtifact = read_json(model_path)?;

        scaler.validate()?;
        if classifier.n_features() != scaler.n_features() {
            return Err(ArtifactError::ArityMismatch {
                scaler: scaler.n_features(),
                classifier: classifier.n_features(),
            });
        }

        log::debug!(
            "loaded artifact pair ({} features, model {})",
            scaler.n_features(),
            classifier.model_name
        );
        Ok(Self { scaler, classifier })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Process-lifetime cache for the artifact pair. The first `get` reads both
/// files; later calls return the same loaded instances without touching
/// storage. Read-only after initialization.
pub struct ArtifactStore {
    scaler_path: PathBuf,
    model_path: PathBuf,
    cell: OnceLock<ArtifactSet>,
}

impl ArtifactStore {
    pub fn new(scaler_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            scaler_path: scaler_path.into(),
            model_path: model_path.into(),
            cell: OnceLock::new(),
        }
    }

    /// Loads on first use, memoized afterwards. Load failures are not cached,
    /// so a later call may retry against fixed files.
    pub fn get(&self) -> Result<&ArtifactSet, ArtifactError> {
        if let Some(loaded) = self.cell.get() {
            return Ok(loaded);
        }
        let loaded = ArtifactSet::load(&self.scaler_path, &self.model_path)?;
        Ok(self.cell.get_or_init(|| loaded))
    }

    /// The cached pair, without triggering a load.
    pub fn cached(&self) -> Result<&ArtifactSet, ArtifactError> {
        self.cell.get().ok_or(ArtifactError::Unavailable)
    }
}
