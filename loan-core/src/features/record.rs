//! Raw Attribute Record
//!
//! The per-request input: field name → text or number. JSON requests and
//! form submissions both land here. Values are coerced lazily, per field,
//! when the aligner asks for them, so keys no schema field reads are never
//! inspected whatever their JSON type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{
    APPLICANT_INCOME, COAPPLICANT_INCOME, CREDIT_HISTORY, LOAN_AMOUNT, LOAN_AMOUNT_TERM,
};
use crate::error::PredictionError;

/// A single raw value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    /// Any other JSON type (bool, array, object); invalid wherever it is read
    Other(Value),
}

impl RawValue {
    /// Numeric reading; text is trimmed and parsed
    pub fn as_number(&self, field: &str) -> Result<f64, PredictionError> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                PredictionError::invalid(field, format!("expected a number, got {:?}", s))
            })?,
            RawValue::Other(v) => return Err(unsupported(field, v)),
        };

        if !value.is_finite() {
            return Err(PredictionError::invalid(field, "value must be finite"));
        }

        Ok(value)
    }

    /// Categorical reading; numbers render in their shortest form (0 → "0")
    pub fn as_level(&self, field: &str) -> Result<String, PredictionError> {
        let level = match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.trim().to_string(),
            RawValue::Other(v) => return Err(unsupported(field, v)),
        };

        if level.is_empty() {
            return Err(PredictionError::invalid(field, "value must not be empty"));
        }

        Ok(level)
    }
}

fn unsupported(field: &str, value: &Value) -> PredictionError {
    let kind = match value {
        Value::Bool(_) => "boolean",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
        Value::Number(_) | Value::String(_) => "value",
    };
    PredictionError::invalid(field, format!("expected a number or a string, got {}", kind))
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => RawValue::Text(s),
            Value::Number(n) => match n.as_f64() {
                Some(n) => RawValue::Number(n),
                None => RawValue::Other(Value::Number(n)),
            },
            other => RawValue::Other(other),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Raw attribute record. JSON `null` values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Value>",
    into = "BTreeMap<String, RawValue>"
)]
pub struct RawRecord {
    values: BTreeMap<String, RawValue>,
}

impl From<BTreeMap<String, Value>> for RawRecord {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self {
            values: map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, RawValue::from(v)))
                .collect(),
        }
    }
}

impl From<RawRecord> for BTreeMap<String, RawValue> {
    fn from(record: RawRecord) -> Self {
        record.values
    }
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<RawValue> {
        self.values.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Record from text pairs (form posts). Blank values count as absent.
    pub fn from_text_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let values = fields
            .into_iter()
            .filter(|(_, v)| !v.as_ref().trim().is_empty())
            .map(|(k, v)| (k.into(), RawValue::Text(v.as_ref().to_string())))
            .collect();

        Self { values }
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// DOMAIN VALIDATION
// ============================================================================

/// Read a numeric field and check it against its domain.
/// Fields without a documented domain only need to be finite.
pub fn numeric_value(field: &str, value: &RawValue) -> Result<f64, PredictionError> {
    let n = value.as_number(field)?;

    match field {
        APPLICANT_INCOME | COAPPLICANT_INCOME | LOAN_AMOUNT if n < 0.0 => {
            Err(PredictionError::invalid(field, format!("must be non-negative, got {}", n)))
        }
        LOAN_AMOUNT_TERM if n <= 0.0 => {
            Err(PredictionError::invalid(field, format!("must be positive, got {}", n)))
        }
        CREDIT_HISTORY if n != 0.0 && n != 1.0 => {
            Err(PredictionError::invalid(field, format!("must be 0.0 or 1.0, got {}", n)))
        }
        _ => Ok(n),
    }
}

/// Read a categorical field. Unknown levels are accepted here; the aligner
/// maps them to the baseline encoding.
pub fn categorical_level(field: &str, value: &RawValue) -> Result<String, PredictionError> {
    value.as_level(field)
}
