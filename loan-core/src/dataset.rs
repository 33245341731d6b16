//! Training Dataset
//!
//! CSV with a header row. `Applicant_ID` is dropped, `Loan_Status` is the
//! target (`Y` → 1, `N` → 0), every other column is a feature.
//!
//! A column is numeric when every non-empty cell parses as a number,
//! otherwise categorical. Rows with a missing feature cell (empty or one of
//! the usual NA markers such as `NA`, `N/A`, `NaN`, `null`) are dropped. The
//! reference schema is derived from the remaining rows and the design matrix
//! is encoded through [`align`], the same path serving uses.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ndarray::Array2;

use crate::constants::{ID_COLUMN, NEGATIVE_TARGET, POSITIVE_TARGET, TARGET_COLUMN};
use crate::error::DatasetError;
use crate::features::{align, RawRecord, RawValue, ReferenceSchema, SchemaField};

/// Cell values read as missing, matching pandas' default `na_values`
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_MARKERS.contains(&cell)
}

/// Encoded training data
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub schema: ReferenceSchema,
    /// Row-major, one row per applicant, columns in schema order
    pub features: Array2<f64>,
    /// 0.0 / 1.0
    pub labels: Vec<f64>,
    /// Rows dropped for missing or out-of-domain values
    pub dropped_rows: usize,
}

impl TrainingData {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        log::info!("Loading training data from {}", path.display());
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
        let target = headers
            .iter()
            .position(|h| h == TARGET_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn(TARGET_COLUMN.to_string()))?;
        let feature_columns: Vec<usize> = (0..headers.len())
            .filter(|&i| i != target && headers[i] != ID_COLUMN)
            .collect();
        if feature_columns.is_empty() {
            return Err(DatasetError::NoFeatures);
        }

        // Complete rows only
        let mut rows: Vec<(Vec<String>, f64)> = Vec::new();
        let mut incomplete = 0;
        for (index, record) in csv.records().enumerate() {
            let record = record?;
            let row = index + 1;

            let label = match record.get(target).unwrap_or("") {
                POSITIVE_TARGET => 1.0,
                NEGATIVE_TARGET => 0.0,
                missing if is_missing(missing) => {
                    incomplete += 1;
                    continue;
                }
                other => {
                    return Err(DatasetError::InvalidTarget {
                        row,
                        value: other.to_string(),
                    })
                }
            };

            let cells: Vec<String> = feature_columns
                .iter()
                .map(|&i| record.get(i).unwrap_or("").to_string())
                .collect();
            if cells.iter().any(|c| is_missing(c)) {
                incomplete += 1;
                continue;
            }

            rows.push((cells, label));
        }

        if incomplete > 0 {
            log::warn!("Dropped {} incomplete rows", incomplete);
        }
        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        let names: Vec<&str> = feature_columns.iter().map(|&i| headers[i].as_str()).collect();
        let cells: Vec<&[String]> = rows.iter().map(|(c, _)| c.as_slice()).collect();
        let schema = derive_schema(&names, &cells);

        // Encode through the serving aligner
        let mut values = Vec::with_capacity(rows.len() * schema.len());
        let mut labels = Vec::with_capacity(rows.len());
        let mut invalid = 0;
        for (row, (cells, label)) in rows.iter().enumerate() {
            let record = to_record(&schema, cells);
            match align(&record, &schema) {
                Ok(vector) => {
                    values.extend_from_slice(vector.as_slice());
                    labels.push(*label);
                }
                Err(e) => {
                    log::warn!("Skipping row {}: {}", row + 1, e);
                    invalid += 1;
                }
            }
        }

        if labels.is_empty() {
            return Err(DatasetError::Empty);
        }

        let features = Array2::from_shape_vec((labels.len(), schema.len()), values)?;
        log::info!(
            "Training data: {} rows x {} columns ({} positive)",
            labels.len(),
            schema.len(),
            labels.iter().filter(|l| **l == 1.0).count()
        );

        Ok(Self {
            schema,
            features,
            labels,
            dropped_rows: incomplete + invalid,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positive_rate(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().sum::<f64>() / self.labels.len() as f64
    }
}

/// Derive the reference schema from complete rows.
/// `rows[r][c]` is the cell of column `names[c]`.
pub fn derive_schema(names: &[&str], rows: &[&[String]]) -> ReferenceSchema {
    let fields = names
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let numeric = rows.iter().all(|row| row[c].parse::<f64>().is_ok());
            if numeric {
                SchemaField::numeric(*name)
            } else {
                SchemaField::categorical(*name, rows.iter().map(|row| row[c].clone()))
            }
        })
        .collect();

    ReferenceSchema::from_fields(fields)
}

/// Raw record for one dataset row; numeric cells are passed as numbers
fn to_record(schema: &ReferenceSchema, cells: &[String]) -> RawRecord {
    schema
        .fields()
        .iter()
        .zip(cells)
        .map(|(field, cell)| {
            let value = match cell.parse::<f64>() {
                Ok(n) if !field.is_categorical() => RawValue::Number(n),
                _ => RawValue::Text(cell.clone()),
            };
            (field.name.clone(), value)
        })
        .collect()
}
