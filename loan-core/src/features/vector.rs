//! Aligned Feature Vector - Core data structure for model input
//!
//! **Versioned vector tied to the schema it was aligned against**
//!
//! Carries the schema version and layout hash so a vector can never be fed
//! to a model trained on a different layout without detection.

use serde::{Deserialize, Serialize};

use super::layout::{LayoutMismatchError, ReferenceSchema};

/// One slot per reference column: 0/1 for indicators, raw value for numerics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedVector {
    /// Schema version the vector was aligned to
    pub version: u8,
    /// CRC32 hash of the schema layout (for mismatch detection)
    pub layout_hash: u32,
    /// Values in reference schema column order
    pub values: Vec<f64>,
}

impl AlignedVector {
    /// Wrap values aligned against `schema`
    pub(crate) fn new(schema: &ReferenceSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        Self {
            version: schema.version(),
            layout_hash: schema.layout_hash(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Get slot by column name
    pub fn get_by_name(&self, schema: &ReferenceSchema, name: &str) -> Option<f64> {
        schema.column_index(name).and_then(|i| self.get(i))
    }

    /// Validate that this vector matches `schema`
    pub fn validate(&self, schema: &ReferenceSchema) -> Result<(), LayoutMismatchError> {
        schema.validate_layout(self.version, self.layout_hash)
    }

    /// Named view for structured logging
    pub fn to_log_entry(&self, schema: &ReferenceSchema) -> serde_json::Value {
        serde_json::json!({
            "schema_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": schema.columns().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.clone(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl From<AlignedVector> for Vec<f64> {
    fn from(vector: AlignedVector) -> Self {
        vector.values
    }
}

// ============================================================================
// TESTS
// ============================================================================
