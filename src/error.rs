use std::path::PathBuf;

use thiserror::Error;

/// Failures around the pretrained scaler and classifier blobs. Everything
/// except `Unavailable` happens at load time and is fatal for the process.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact file {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode artifact file {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("scaler feature schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("scaler has {values} parameter values for {names} feature names")]
    UnevenScaler { names: usize, values: usize },
    #[error("scaler has zero variance for feature {field}")]
    DegenerateScale { field: String },
    #[error("classifier expects {classifier} features but scaler produces {scaler}")]
    ArityMismatch { scaler: usize, classifier: usize },
    #[error("artifacts have not been loaded")]
    Unavailable,
}

/// A record that must not reach the scaler. Recoverable: the caller re-prompts
/// or skips the row instead of scoring garbage.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} value {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("expected {expected} features, got {actual}")]
    WrongArity { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
