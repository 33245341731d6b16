//! Error taxonomy
//!
//! `PredictionError` is the request-boundary taxonomy: every variant is
//! recoverable and maps to a structured response. `ArtifactError` and
//! `DatasetError` cover startup and training.

use thiserror::Error;

use crate::features::layout::LayoutMismatchError;

// ============================================================================
// PREDICTION (request boundary)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// Required field absent from the raw record
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Field present but outside its documented domain
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Classifier or reference schema not available
    #[error("predictor not ready: {0}")]
    NotReady(String),
}

impl PredictionError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self::NotReady(reason.into())
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::InvalidValue { .. } => "invalid_value",
            Self::NotReady(_) => "not_ready",
        }
    }

    /// Offending field, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } | Self::InvalidValue { field, .. } => Some(field),
            Self::NotReady(_) => None,
        }
    }
}

// ============================================================================
// ARTIFACT (startup)
// ============================================================================

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported artifact format v{found} (expected v{expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("reference schema is empty")]
    EmptySchema,

    #[error("reference schema columns do not match its fields")]
    InconsistentSchema,

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("model expects {model} features but schema has {schema} columns")]
    FeatureCountMismatch { model: usize, schema: usize },

    #[error("malformed model: {0}")]
    MalformedModel(String),

    #[error("already initialized")]
    AlreadyInitialized,
}

// ============================================================================
// DATASET / TRAINING
// ============================================================================

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("row {row}: unexpected target value {value:?}")]
    InvalidTarget { row: usize, value: String },

    #[error("dataset has no feature columns")]
    NoFeatures,

    #[error("dataset has no usable rows")]
    Empty,

    #[error("design matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("{labels} labels for {rows} rows")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("invalid training config: {0}")]
    InvalidConfig(String),
}
