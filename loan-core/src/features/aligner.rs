//! Feature Aligner
//!
//! Turns a raw record into the exact vector the model was fit on:
//!
//! 1. Numeric fields are validated and copied.
//! 2. Categorical fields produce `<Field>_<level>` = 1 unless the level is
//!    the baseline.
//! 3. Every reference column takes its produced value or 0. Produced columns
//!    outside the schema (levels never seen in training) are dropped, so an
//!    unseen level encodes exactly like the baseline.
//!
//! Training encodes its design matrix through the same [`align`].

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use super::layout::{indicator_column, FieldKind, ReferenceSchema};
use super::record::{categorical_level, numeric_value, RawRecord};
use super::vector::AlignedVector;
use crate::error::{ArtifactError, PredictionError};

/// Align `record` against `schema`.
///
/// Fields are checked in schema order; the first missing or invalid field is
/// reported. An empty schema is refused with `NotReady`.
pub fn align(record: &RawRecord, schema: &ReferenceSchema) -> Result<AlignedVector, PredictionError> {
    if schema.is_empty() {
        return Err(PredictionError::not_ready("reference schema is empty"));
    }

    let mut produced: HashMap<String, f64> = HashMap::with_capacity(schema.len());

    for field in schema.fields() {
        let value = record
            .get(&field.name)
            .ok_or_else(|| PredictionError::missing(&field.name))?;

        match &field.kind {
            FieldKind::Numeric => {
                produced.insert(field.name.clone(), numeric_value(&field.name, value)?);
            }
            FieldKind::Categorical { baseline, .. } => {
                let level = categorical_level(&field.name, value)?;
                if level != *baseline {
                    produced.insert(indicator_column(&field.name, &level), 1.0);
                }
            }
        }
    }

    let values = schema
        .columns()
        .iter()
        .map(|column| produced.get(column).copied().unwrap_or(0.0))
        .collect();

    Ok(AlignedVector::new(schema, values))
}

/// Aligner bound to a process-wide reference schema.
///
/// The schema is set exactly once, before requests are served, and is
/// read-only afterwards. Aligning before that fails with `NotReady`.
#[derive(Debug, Default)]
pub struct FeatureAligner {
    schema: OnceCell<ReferenceSchema>,
}

impl FeatureAligner {
    /// Aligner with no schema yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Aligner initialized with `schema`
    pub fn with_schema(schema: ReferenceSchema) -> Result<Self, ArtifactError> {
        let aligner = Self::new();
        aligner.initialize(schema)?;
        Ok(aligner)
    }

    /// One-shot initialization. Empty schemas are refused.
    pub fn initialize(&self, schema: ReferenceSchema) -> Result<(), ArtifactError> {
        if schema.is_empty() {
            return Err(ArtifactError::EmptySchema);
        }

        let (columns, hash) = (schema.len(), schema.layout_hash());
        self.schema
            .set(schema)
            .map_err(|_| ArtifactError::AlreadyInitialized)?;

        log::info!("Reference schema ready: {} columns (hash: {:08x})", columns, hash);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.schema.get().is_some()
    }

    pub fn schema(&self) -> Option<&ReferenceSchema> {
        self.schema.get()
    }

    /// Align against the installed schema
    pub fn align(&self, record: &RawRecord) -> Result<AlignedVector, PredictionError> {
        let schema = self
            .schema
            .get()
            .ok_or_else(|| PredictionError::not_ready("reference schema not initialized"))?;

        align(record, schema)
    }
}
