//! Reference Schema - Training-time Feature Layout
//!
//! **CRITICAL: this layout is the model's input contract**
//!
//! ## Rules (NEVER break these):
//! 1. The schema is derived once, at training time, and shipped inside the
//!    model artifact.
//! 2. Column order and presence define the input vector. Serving never
//!    re-derives it from request data.
//! 3. Changing the derivation convention → increment SCHEMA_VERSION.
//!
//! ## Column convention
//! Numeric fields first, in dataset order. Then every categorical field in
//! dataset order, one `<Field>_<level>` indicator per non-baseline level, with
//! levels sorted. The baseline is the smallest level and has no column
//! ("drop-first").

use std::collections::BTreeSet;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// SCHEMA VERSION
// ============================================================================

/// Current schema derivation version
/// MUST be incremented when the column convention changes
pub const SCHEMA_VERSION: u8 = 1;

// ============================================================================
// FIELDS
// ============================================================================

/// How a raw field is turned into columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Copied as-is into a column named after the field
    Numeric,
    /// One indicator per non-baseline level
    Categorical { baseline: String, levels: Vec<String> },
}

/// A raw record field the schema requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
}

impl SchemaField {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Numeric,
        }
    }

    /// Categorical field over the observed levels.
    /// Levels are sorted and de-duplicated; the first one becomes the baseline.
    pub fn categorical<I, S>(name: impl Into<String>, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels: Vec<String> = levels
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let baseline = levels.first().cloned().unwrap_or_default();

        Self {
            name: name.into(),
            kind: FieldKind::Categorical { baseline, levels },
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }

    /// Baseline level (categorical fields only)
    pub fn baseline(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Categorical { baseline, .. } => Some(baseline),
            FieldKind::Numeric => None,
        }
    }

    /// Columns contributed by this field, in layout order
    pub fn columns(&self) -> Vec<String> {
        match &self.kind {
            FieldKind::Numeric => vec![self.name.clone()],
            FieldKind::Categorical { baseline, levels } => levels
                .iter()
                .filter(|level| *level != baseline)
                .map(|level| indicator_column(&self.name, level))
                .collect(),
        }
    }
}

/// Indicator column name for a categorical level
pub fn indicator_column(field: &str, level: &str) -> String {
    format!("{}_{}", field, level)
}

/// Derive the ordered column list from fields
fn derive_columns(fields: &[SchemaField]) -> Vec<String> {
    let numeric = fields.iter().filter(|f| !f.is_categorical());
    let categorical = fields.iter().filter(|f| f.is_categorical());

    numeric.chain(categorical).flat_map(SchemaField::columns).collect()
}

// ============================================================================
// REFERENCE SCHEMA
// ============================================================================

/// Ordered column list the model was fit on, plus the fields that produce it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSchema {
    version: u8,
    fields: Vec<SchemaField>,
    columns: Vec<String>,
}

impl ReferenceSchema {
    /// Build a schema from fields in dataset order
    pub fn from_fields(fields: Vec<SchemaField>) -> Self {
        let columns = derive_columns(&fields);
        Self {
            version: SCHEMA_VERSION,
            fields,
            columns,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns still match what the fields derive (detects hand-edited artifacts)
    pub fn is_consistent(&self) -> bool {
        self.columns == derive_columns(&self.fields)
    }

    /// Column index by name (O(n) but columns are few)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    // ========================================================================
    // LAYOUT HASH
    // ========================================================================

    /// CRC32 over version and ordered column names
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();

        hasher.update(&[self.version]);

        for name in &self.columns {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }

        hasher.finalize()
    }

    /// Validate that incoming data was produced against this layout
    pub fn validate_layout(
        &self,
        incoming_version: u8,
        incoming_hash: u32,
    ) -> Result<(), LayoutMismatchError> {
        let current_hash = self.layout_hash();

        if incoming_version != self.version || incoming_hash != current_hash {
            return Err(LayoutMismatchError {
                expected_version: self.version,
                expected_hash: current_hash,
                actual_version: incoming_version,
                actual_hash: incoming_hash,
            });
        }

        Ok(())
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            version: self.version,
            hash: self.layout_hash(),
            feature_count: self.len(),
            feature_names: self.columns.clone(),
        }
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout summary for status endpoints and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a vector or artifact doesn't match the expected layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

// ============================================================================
// TESTS
// ============================================================================
